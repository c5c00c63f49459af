use serde::{Deserialize, Serialize};

/// Top level of a route declaration file
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct YmlSettings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeSettings>,
    #[serde(default)]
    pub routes: Vec<RouteSettings>,
}

/// A named variable type: `{name:var}` values must match `pattern`
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct TypeSettings {
    pub name: String,
    pub pattern: String,
}

/// One `(pattern, service, home)` route declaration
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RouteSettings {
    pub pattern: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub home: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde() {
        let settings = YmlSettings {
            types: vec![TypeSettings {
                name: "year".to_string(),
                pattern: "[0-9]{4}".to_string(),
            }],
            routes: vec![RouteSettings {
                pattern: "/index.html".to_string(),
                service: "home".to_string(),
                home: true,
                description: None,
            }],
        };

        let yml = serde_yaml::to_string(&settings).unwrap();
        let deserde: YmlSettings = serde_yaml::from_str(&yml).unwrap();
        assert_eq!(settings, deserde);
    }

    #[test]
    fn test_defaults() {
        let yml = "routes:\n  - pattern: /a\n    service: a\n";
        let settings: YmlSettings = serde_yaml::from_str(yml).unwrap();
        assert!(settings.types.is_empty());
        assert_eq!(settings.routes.len(), 1);
        assert!(!settings.routes[0].home);
        assert!(settings.routes[0].description.is_none());
    }

    #[test]
    fn test_skip_default_fields_in_yaml() {
        let settings = YmlSettings {
            types: Vec::new(),
            routes: vec![RouteSettings {
                pattern: "/a".to_string(),
                service: "a".to_string(),
                home: false,
                description: None,
            }],
        };

        let yml = serde_yaml::to_string(&settings).unwrap();

        // Verify that default fields are not serialized
        assert!(!yml.contains("types:"));
        assert!(!yml.contains("home:"));
        assert!(!yml.contains("description:"));

        // Verify that required fields are present
        assert!(yml.contains("pattern:"));
        assert!(yml.contains("service:"));
    }

    #[test]
    fn test_unknown_route_field_ignored() {
        let yml = "routes:\n  - pattern: /a\n    service: a\n    method: GET\n";
        let settings: YmlSettings = serde_yaml::from_str(yml).unwrap();
        assert_eq!(settings.routes[0].service, "a");
    }
}
