//! Route registry: resolves incoming paths to services.
//!
//! A [`Registry`] is built once by a [`RegistryBuilder`] and never mutated
//! afterwards. Reloads build a new registry and swap it into a
//! [`SharedRegistry`], so readers always see a complete snapshot.

use arc_swap::ArcSwap;
use regex::RegexSet;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::parameters::{Parameters, UriParameters};
use super::template::{Expandable, Template, TemplateParser, VariableTypes};
use crate::error::FuriError;

/// A template bound to the service it dispatches to
#[derive(Debug, Clone)]
pub struct Route {
    pub template: Arc<Template>,
    pub service: String,
    /// Set on the secondary route bound to a home template's directory
    pub home_of: Option<String>,
    order: usize,
}

impl Route {
    pub fn pattern(&self) -> &str {
        self.template.source()
    }

    // Fewer variables first, then more literal text, then registration order
    fn precedence(&self) -> (usize, std::cmp::Reverse<usize>, usize) {
        (
            self.template.variable_count(),
            std::cmp::Reverse(self.template.literal_len()),
            self.order,
        )
    }
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub service: String,
    pub pattern: String,
    pub parameters: UriParameters,
}

/// Serializable view of a route for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub pattern: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_of: Option<String>,
}

/// Collects registrations before freezing them into a [`Registry`]
pub struct RegistryBuilder {
    types: VariableTypes,
    routes: Vec<Route>,
    patterns: HashMap<String, usize>,
    homes: HashMap<String, usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::with_types(VariableTypes::new())
    }

    pub fn with_types(types: VariableTypes) -> Self {
        Self {
            types,
            routes: Vec::new(),
            patterns: HashMap::new(),
            homes: HashMap::new(),
        }
    }

    pub fn types(&self) -> &VariableTypes {
        &self.types
    }

    /// Compile `pattern` and bind it to `service`.
    ///
    /// Nothing is registered when the pattern is malformed.
    pub fn register(
        &mut self,
        pattern: &str,
        service: &str,
        is_home: bool,
    ) -> Result<&mut Self, FuriError> {
        let template = TemplateParser::parse_with(pattern, &self.types)?;
        Ok(self.register_template(Arc::new(template), service, is_home))
    }

    /// Bind an already compiled template to `service`
    pub fn register_template(
        &mut self,
        template: Arc<Template>,
        service: &str,
        is_home: bool,
    ) -> &mut Self {
        let pattern = template.source().to_string();

        if let Some(&existing) = self.patterns.get(&pattern) {
            warn!(
                pattern = %pattern,
                service,
                kept = %self.routes[existing].service,
                "Duplicate pattern ignored"
            );
            return self;
        }

        if is_home {
            self.register_home(&template, service);
        }

        // An explicit route takes over the directory binding of an earlier home
        if let Some(index) = self.homes.remove(&pattern) {
            let route = &mut self.routes[index];
            warn!(
                pattern = %pattern,
                home_service = %route.service,
                service,
                "Explicit route replaces home directory binding"
            );
            route.template = template;
            route.service = service.to_string();
            route.home_of = None;
            self.patterns.insert(pattern, index);
            return self;
        }

        self.patterns.insert(pattern, self.routes.len());
        self.push(template, service, None);
        self
    }

    fn register_home(&mut self, template: &Template, service: &str) {
        let Some(prefix) = template.home_prefix() else {
            warn!(pattern = template.source(), "Home template has no directory prefix");
            return;
        };

        if let Some(&existing) = self.patterns.get(&prefix) {
            warn!(
                prefix = %prefix,
                kept = %self.routes[existing].service,
                service,
                "Home directory already registered explicitly"
            );
            return;
        }

        if let Some(&index) = self.homes.get(&prefix) {
            // Last registration wins
            let route = &mut self.routes[index];
            warn!(
                prefix = %prefix,
                previous = %route.service,
                service,
                "Duplicate home for directory"
            );
            route.service = service.to_string();
            route.home_of = Some(template.source().to_string());
            return;
        }

        let home = match TemplateParser::parse_with(&prefix, &self.types) {
            Ok(home) => home,
            Err(e) => {
                warn!(prefix = %prefix, error = %e, "Could not compile home prefix");
                return;
            }
        };

        self.homes.insert(prefix, self.routes.len());
        self.push(Arc::new(home), service, Some(template.source().to_string()));
    }

    fn push(&mut self, template: Arc<Template>, service: &str, home_of: Option<String>) {
        let order = self.routes.len();
        self.routes.push(Route {
            template,
            service: service.to_string(),
            home_of,
            order,
        });
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the registrations into an immutable registry
    pub fn build(self) -> Result<Registry, FuriError> {
        let mut routes = self.routes;

        // First plain registration per service is used for expansion
        let mut by_service = HashMap::new();
        for route in routes.iter().filter(|r| r.home_of.is_none()) {
            by_service
                .entry(route.service.clone())
                .or_insert_with(|| Arc::clone(&route.template));
        }

        routes.sort_by_key(Route::precedence);
        let index = RegexSet::new(routes.iter().map(|r| r.template.regex().as_str()))?;

        info!(routes = routes.len(), services = by_service.len(), "Route registry built");

        Ok(Registry {
            routes,
            index,
            by_service,
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable set of routes
#[derive(Debug)]
pub struct Registry {
    /// Sorted by precedence
    routes: Vec<Route>,
    index: RegexSet,
    by_service: HashMap<String, Arc<Template>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn empty() -> Self {
        Self {
            routes: Vec::new(),
            index: RegexSet::empty(),
            by_service: HashMap::new(),
        }
    }

    /// Resolve a path to its most specific route
    pub fn resolve(&self, path: &str) -> Option<Resolution> {
        let resolution = self.candidates(path).next();
        match &resolution {
            Some(r) => debug!(path, service = %r.service, pattern = %r.pattern, "Resolved"),
            None => debug!(path, "No route matched"),
        }
        resolution
    }

    /// Every route matching the path, most specific first
    pub fn resolve_all(&self, path: &str) -> Vec<Resolution> {
        self.candidates(path).collect()
    }

    fn candidates<'a>(&'a self, path: &'a str) -> impl Iterator<Item = Resolution> + 'a {
        // Set indices come out in ascending order, which is precedence order
        self.index.matches(path).into_iter().filter_map(move |i| {
            let route = &self.routes[i];
            route.template.extract(path).map(|parameters| Resolution {
                service: route.service.clone(),
                pattern: route.pattern().to_string(),
                parameters,
            })
        })
    }

    /// Template expansion for a service; absent when the service is unknown
    pub fn expand(&self, service: &str, parameters: &dyn Parameters) -> Option<String> {
        self.template_for(service).map(|t| t.expand(parameters))
    }

    /// First template registered for a service
    pub fn template_for(&self, service: &str) -> Option<&Arc<Template>> {
        self.by_service.get(service)
    }

    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|r| RouteInfo {
                pattern: r.pattern().to_string(),
                service: r.service.clone(),
                home_of: r.home_of.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Registry handle shared across request handlers.
///
/// Reads are lock-free; a reload replaces the whole registry at once.
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<ArcSwap<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(registry)),
        }
    }

    /// Current snapshot
    pub fn load(&self) -> Arc<Registry> {
        self.inner.load_full()
    }

    /// Swap in a new registry, returning the previous one
    pub fn replace(&self, registry: Registry) -> Arc<Registry> {
        let routes = registry.len();
        let previous = self.inner.swap(Arc::new(registry));
        info!(routes, previous = previous.len(), "Route registry replaced");
        previous
    }
}
