use crate::{
    config::yml_settings::YmlSettings,
    domain::{
        template::{VariableType, VariableTypes},
        Registry, RegistryBuilder,
    },
};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "routes.yml";

/// Builds registries from route declaration files.
pub struct RouteTable;

impl RouteTable {
    /// Read and parse a declaration file; I/O and YAML errors are fatal.
    pub fn read_settings(path: &Path) -> Result<YmlSettings> {
        let yml = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read route file {}", path.display()))?;
        let settings: YmlSettings = serde_yaml::from_str(&yml)
            .with_context(|| format!("Invalid route configuration in {}", path.display()))?;
        Ok(settings)
    }

    /// Load the declarations at `path` (default `routes.yml`) into a registry
    pub fn load(maybe_path: Option<&Path>) -> Result<Registry> {
        let path = maybe_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let settings = Self::read_settings(path)?;
        let registry = Self::build(settings)?;
        info!(path = %path.display(), routes = registry.len(), "Routes loaded");
        Ok(registry)
    }

    /// Build a registry, skipping invalid types and malformed patterns
    pub fn build(settings: YmlSettings) -> Result<Registry> {
        let mut types = VariableTypes::new();
        for type_settings in settings.types {
            match VariableType::new(&type_settings.name, &type_settings.pattern) {
                Ok(var_type) => {
                    types.register(var_type);
                }
                Err(e) => warn!(name = %type_settings.name, error = %e, "Skipping variable type"),
            }
        }

        let mut builder = RegistryBuilder::with_types(types);
        for route in settings.routes {
            if let Err(e) = builder.register(&route.pattern, &route.service, route.home) {
                warn!(
                    pattern = %route.pattern,
                    service = %route.service,
                    error = %e,
                    "Skipping route"
                );
            }
        }

        builder.build().context("Could not build route index")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::yml_settings::{RouteSettings, TypeSettings};

    fn route(pattern: &str, service: &str, home: bool) -> RouteSettings {
        RouteSettings {
            pattern: pattern.to_string(),
            service: service.to_string(),
            home,
            description: None,
        }
    }

    #[test]
    fn test_valid_default_file() {
        // ensure that the bundled routes.yml builds
        let registry = RouteTable::load(None).unwrap();
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_malformed_route_skipped() {
        let settings = YmlSettings {
            types: Vec::new(),
            routes: vec![route("/{a b}", "bad", false), route("/good", "good", false)],
        };
        let registry = RouteTable::build(settings).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("/good").unwrap().service, "good");
    }

    #[test]
    fn test_custom_type() {
        let settings = YmlSettings {
            types: vec![TypeSettings {
                name: "year".to_string(),
                pattern: "[0-9]{4}".to_string(),
            }],
            routes: vec![route("/archive/{year:y}", "archive", false)],
        };
        let registry = RouteTable::build(settings).unwrap();
        assert!(registry.resolve("/archive/2024").is_some());
        assert!(registry.resolve("/archive/24").is_none());
    }

    #[test]
    fn test_invalid_type_skips_dependent_routes() {
        let settings = YmlSettings {
            types: vec![TypeSettings {
                name: "year".to_string(),
                pattern: "([0-9]{4})".to_string(),
            }],
            routes: vec![
                route("/archive/{year:y}", "archive", false),
                route("/", "root", false),
            ],
        };
        let registry = RouteTable::build(settings).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("/").is_some());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = RouteTable::load(Some(Path::new("does-not-exist.yml"))).unwrap_err();
        assert!(err.to_string().contains("Could not read route file"));
    }
}
