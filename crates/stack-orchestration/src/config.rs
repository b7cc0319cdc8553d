//! Service-definition document parsing
//!
//! A definition document is a compose-style YAML file with a top-level
//! `services` mapping. Only the service names are inspected here; per-service
//! configuration is carried opaquely and never interpreted.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading service-definition documents
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the definition file
    #[error("failed to read definition file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse YAML
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A parsed service-definition document
#[derive(Debug, Clone, Deserialize)]
pub struct StackDefinition {
    /// Mapping from service name to its (uninterpreted) configuration
    pub services: BTreeMap<String, serde_yaml::Value>,
}

impl StackDefinition {
    /// Names of the services declared in this document
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

/// Parse a definition document from a file
pub fn parse_file(path: impl AsRef<Path>) -> Result<StackDefinition, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parse a definition document from a string
pub fn parse_str(content: &str) -> Result<StackDefinition, ConfigError> {
    let definition: StackDefinition = serde_yaml::from_str(content)?;
    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_names() {
        let definition = parse_str(
            r#"
services:
  web:
    image: nginx:latest
    ports:
      - "80:80"
  db:
    image: postgres:16
"#,
        )
        .expect("parse failed");

        let names: Vec<&str> = definition.service_names().collect();
        assert_eq!(names, vec!["db", "web"]);
    }

    #[test]
    fn service_configuration_is_not_interpreted() {
        // Arbitrary nesting under a service must not break parsing
        let definition = parse_str(
            r#"
services:
  worker:
    deploy:
      replicas: 3
      placement:
        constraints: [node.role == worker]
"#,
        )
        .expect("parse failed");
        assert_eq!(definition.services.len(), 1);
    }

    #[test]
    fn missing_services_key_is_an_error() {
        let err = parse_str("version: '3'\n").expect_err("should fail");
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn empty_services_mapping_parses() {
        // The non-empty invariant belongs to the stack, which unions several
        // documents; a single document may legitimately be empty.
        let definition = parse_str("services: {}\n").expect("parse failed");
        assert_eq!(definition.services.len(), 0);
    }
}
