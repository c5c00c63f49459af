//! Bounded cache of compiled templates.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

use super::template::{Template, TemplateParser, VariableTypes};
use crate::error::FuriError;

pub const DEFAULT_CAPACITY: usize = 256;

/// LRU cache mapping pattern strings to compiled templates
pub struct TemplateCache {
    templates: Mutex<LruCache<String, Arc<Template>>>,
    types: VariableTypes,
}

impl TemplateCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_types(capacity, VariableTypes::new())
    }

    pub fn with_types(capacity: usize, types: VariableTypes) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            templates: Mutex::new(LruCache::new(capacity)),
            types,
        }
    }

    /// Return the compiled template for `pattern`, compiling it on a miss.
    /// Failed compilations are not cached.
    pub fn get_or_compile(&self, pattern: &str) -> Result<Arc<Template>, FuriError> {
        if let Some(template) = self.templates.lock().get(pattern) {
            return Ok(Arc::clone(template));
        }

        debug!(pattern, "template cache miss");
        let template = Arc::new(TemplateParser::parse_with(pattern, &self.types)?);
        self.templates
            .lock()
            .put(pattern.to_string(), Arc::clone(&template));
        Ok(template)
    }

    pub fn len(&self) -> usize {
        self.templates.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.lock().is_empty()
    }

    pub fn clear(&self) {
        self.templates.lock().clear();
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_returns_same_template() {
        let cache = TemplateCache::new(4);
        let a = cache.get_or_compile("/a/{b}").unwrap();
        let b = cache.get_or_compile("/a/{b}").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = TemplateCache::new(2);
        let first = cache.get_or_compile("/1").unwrap();
        cache.get_or_compile("/2").unwrap();
        cache.get_or_compile("/3").unwrap();
        assert_eq!(cache.len(), 2);

        let again = cache.get_or_compile("/1").unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(first, again);
    }

    #[test]
    fn test_errors_not_cached() {
        let cache = TemplateCache::new(2);
        assert!(cache.get_or_compile("/{a b}").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = TemplateCache::new(0);
        cache.get_or_compile("/x").unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
