// Variable types constrain the values a typed variable can match

use regex::Regex;
use std::collections::HashMap;
use std::fmt;

use crate::error::FuriError;

/// A named regular expression constraining variable values
#[derive(Clone)]
pub struct VariableType {
    name: String,
    pattern: String,
    anchored: Regex,
}

impl VariableType {
    pub fn new(name: &str, pattern: &str) -> Result<Self, FuriError> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            FuriError::InvalidType {
                name: name.to_string(),
                source,
            }
        })?;

        // Capture groups would shift the template's one-group-per-token layout
        if anchored.captures_len() != 1 {
            return Err(FuriError::CapturingType(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            anchored,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check that the whole value belongs to this type
    pub fn accepts(&self, value: &str) -> bool {
        self.anchored.is_match(value)
    }
}

impl fmt::Debug for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableType")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl PartialEq for VariableType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.pattern == other.pattern
    }
}

impl Eq for VariableType {}

/// Registry of variable types known to the parser
#[derive(Debug, Clone)]
pub struct VariableTypes {
    types: HashMap<String, VariableType>,
}

impl VariableTypes {
    /// Registry holding the built-in types
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for (name, pattern) in [("int", "[0-9]+"), ("alpha", "[A-Za-z]+"), ("alnum", "[A-Za-z0-9]+")] {
            // Built-in patterns are known to be valid
            if let Ok(var_type) = VariableType::new(name, pattern) {
                registry.register(var_type);
            }
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register a type, replacing any type with the same name
    pub fn register(&mut self, var_type: VariableType) -> Option<VariableType> {
        self.types.insert(var_type.name.clone(), var_type)
    }

    pub fn get(&self, name: &str) -> Option<&VariableType> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for VariableTypes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_types() {
        let registry = VariableTypes::new();
        assert!(registry.get("int").is_some());
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("alnum").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_accepts_whole_value() {
        let int = VariableType::new("int", "[0-9]+").unwrap();
        assert!(int.accepts("2024"));
        assert!(!int.accepts("20a4"));
        assert!(!int.accepts(""));
    }

    #[test]
    fn test_alternation_is_anchored() {
        let lang = VariableType::new("lang", "en|fr").unwrap();
        assert!(lang.accepts("fr"));
        assert!(!lang.accepts("french"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = VariableType::new("broken", "[0-9");
        assert!(matches!(result, Err(FuriError::InvalidType { .. })));
    }

    #[test]
    fn test_capture_groups_rejected() {
        let result = VariableType::new("year", "([0-9]{4})");
        assert!(matches!(result, Err(FuriError::CapturingType(name)) if name == "year"));

        // Non-capturing groups are fine
        assert!(VariableType::new("year", "(?:19|20)[0-9]{2}").is_ok());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = VariableTypes::empty();
        assert!(registry
            .register(VariableType::new("id", "[0-9]+").unwrap())
            .is_none());
        let previous = registry.register(VariableType::new("id", "[a-f0-9]+").unwrap());
        assert_eq!(previous.unwrap().pattern(), "[0-9]+");
        assert_eq!(registry.get("id").unwrap().pattern(), "[a-f0-9]+");
        assert_eq!(registry.len(), 1);
    }
}
