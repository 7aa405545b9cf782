//! # Schema Files
//!
//! Loads a schema file into a registry. A file holds either one descriptor
//! or a bundle `{definitions: {<name>: <descriptor>}, schema: <descriptor or name>}`.
//! Definitions are registered under their names before the root is built,
//! and the patch queue is flushed afterwards so every `ref` target is bound.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use vschema_types::{Constrained, Registry, Schema};

/// Bundle key holding named definitions.
pub const DEFINITIONS: &str = "definitions";

/// Bundle key holding the root schema.
pub const ROOT: &str = "schema";

/// A schema file loaded into a registry.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// The schema documents are validated against.
    pub root: Arc<Schema>,
    /// Names of the definitions the file registered, in file order.
    pub definitions: Vec<String>,
}

/// Read `path` and load it into `registry`.
pub fn load_schema_file(path: &Path, registry: &Registry) -> Result<LoadedSchema> {
    let document = crate::load_document(path)?;
    load_schema(&document, registry).with_context(|| format!("invalid schema in {}", path.display()))
}

/// Load a descriptor or bundle into `registry`.
pub fn load_schema(document: &Value, registry: &Registry) -> Result<LoadedSchema> {
    let is_bundle = document
        .as_object()
        .is_some_and(|map| map.contains_key(DEFINITIONS) || map.contains_key(ROOT));
    if !is_bundle {
        let root = registry.from_descriptor(document)?;
        registry.flush();
        return Ok(LoadedSchema {
            root: Arc::new(root),
            definitions: Vec::new(),
        });
    }

    let mut definitions = Vec::new();
    if let Some(defs) = document.get(DEFINITIONS) {
        let Some(defs) = defs.as_object() else {
            bail!("`{DEFINITIONS}` must map names to descriptors");
        };
        for (name, descriptor) in defs {
            let schema = registry
                .from_descriptor(descriptor)
                .with_context(|| format!("in definition `{name}`"))?
                .named(name.as_str());
            registry.register(schema)?;
            tracing::debug!(name = %name, "registered definition");
            definitions.push(name.clone());
        }
    }

    let root = match document.get(ROOT) {
        Some(Value::String(name)) => registry
            .get(name)
            .with_context(|| format!("root schema `{name}` is not defined"))?,
        Some(descriptor) => Arc::new(registry.from_descriptor(descriptor).context("in root schema")?),
        None => bail!("schema bundle has no `{ROOT}` entry"),
    };
    registry.flush();
    Ok(LoadedSchema { root, definitions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vschema_types::{FlushPolicy, RegistryConfig, Validate};

    fn registry() -> Registry {
        Registry::with_config(RegistryConfig {
            register_builtins: true,
            flush_policy: FlushPolicy::Manual,
        })
    }

    #[test]
    fn plain_descriptor_loads_as_root() {
        let loaded = load_schema(&json!({"string": {"min": 2}}), &registry()).unwrap();
        assert!(loaded.definitions.is_empty());
        assert!(loaded.root.is_valid(&json!("ab")));
        assert!(!loaded.root.is_valid(&json!("a")));
    }

    #[test]
    fn bundle_with_named_root_and_self_reference() {
        let registry = registry();
        let bundle = json!({
            "definitions": {
                "Person": {"object": {"properties": {
                    "name": {"string": {"nonEmpty": true}},
                    "manager": {"ref": {"target": "Person", "optional": true}}
                }}}
            },
            "schema": "Person"
        });
        let loaded = load_schema(&bundle, &registry).unwrap();
        assert_eq!(loaded.definitions, ["Person"]);
        assert!(loaded.root.is_valid(&json!({"name": "A", "manager": {"name": "B"}})));
        let err = loaded
            .root
            .validate(&json!({"name": "A", "manager": {"name": ""}}))
            .unwrap_err();
        assert_eq!(err.violations()[0].path, "manager.name");
    }

    #[test]
    fn bundle_root_may_be_a_descriptor_using_definitions() {
        let bundle = json!({
            "definitions": {
                "Address": {"object": {"properties": {"country": {"string": {"length": 2}}}}}
            },
            "schema": {"object": {"properties": {"home": {"ref": {"target": "Address"}}}}}
        });
        let loaded = load_schema(&bundle, &registry()).unwrap();
        assert!(loaded.root.is_valid(&json!({"home": {"country": "GB"}})));
        let err = loaded.root.validate(&json!({"home": {"country": "GBR"}})).unwrap_err();
        assert_eq!(err.violations()[0].path, "home.country");
        assert_eq!(err.violations()[0].name, "length");
    }

    #[test]
    fn bundle_errors_are_reported() {
        let err = load_schema(&json!({"definitions": {}}), &registry()).unwrap_err();
        assert!(err.to_string().contains("no `schema` entry"));

        let err = load_schema(&json!({"schema": "Nope"}), &registry()).unwrap_err();
        assert!(err.to_string().contains("`Nope` is not defined"));

        let err = load_schema(
            &json!({"definitions": {"Bad": {"string": {"between": 1}}}, "schema": "Bad"}),
            &registry(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("definition `Bad`"));
    }

    #[test]
    fn load_schema_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flag.schema.yaml");
        std::fs::write(&path, "boolean:\n  isTrue: true\n").unwrap();
        let loaded = load_schema_file(&path, &registry()).unwrap();
        assert!(loaded.root.is_valid(&json!(true)));
        assert!(!loaded.root.is_valid(&json!(false)));
    }
}
