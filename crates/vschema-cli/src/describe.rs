//! # Describe Subcommand
//!
//! Loads a schema file and prints its one-line summary followed by its
//! normalized descriptor.
//!
//! Normalization is lossy. Descriptors carry constraints only, so the
//! `optional` and `nullable` flags are dropped and numeric subkinds such as
//! `integer` print as `number`. Feeding the output back to
//! `vschema validate` can therefore validate differently: a self-referencing
//! `manager: { ref: { target: Person, optional: true } }` comes back as a
//! required reference.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value};

use vschema_types::{Constrained, Registry};

use crate::schema_file::{load_schema_file, LoadedSchema, DEFINITIONS, ROOT};

/// Arguments for the `vschema describe` subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Schema file to describe.
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Print the descriptor as YAML instead of JSON.
    #[arg(long)]
    pub yaml: bool,
}

/// The normalized document for a loaded schema file: the plain descriptor,
/// or a bundle with every definition re-rendered.
pub fn normalized(loaded: &LoadedSchema, registry: &Registry) -> Value {
    if loaded.definitions.is_empty() {
        return loaded.root.to_descriptor();
    }
    let definitions: Map<String, Value> = loaded
        .definitions
        .iter()
        .filter_map(|name| {
            registry
                .get(name)
                .map(|schema| (name.clone(), schema.to_descriptor()))
        })
        .collect();
    let root = match loaded.root.name() {
        Some(name) if loaded.definitions.iter().any(|d| d == name) => Value::from(name),
        _ => loaded.root.to_descriptor(),
    };
    let mut bundle = Map::new();
    bundle.insert(DEFINITIONS.to_string(), Value::Object(definitions));
    bundle.insert(ROOT.to_string(), root);
    Value::Object(bundle)
}

/// Execute the describe subcommand.
pub fn run_describe(args: &DescribeArgs, registry: &Registry) -> Result<u8> {
    let loaded = load_schema_file(&args.schema, registry)?;
    let document = normalized(&loaded, registry);

    println!("# {}", loaded.root);
    if args.yaml {
        print!("{}", serde_yaml::to_string(&document)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&document)?);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_file::load_schema;
    use serde_json::json;
    use vschema_types::{FlushPolicy, RegistryConfig, Validate};

    fn registry() -> Registry {
        Registry::with_config(RegistryConfig {
            register_builtins: true,
            flush_policy: FlushPolicy::Manual,
        })
    }

    #[test]
    fn plain_descriptor_is_normalized() {
        let registry = registry();
        let loaded = load_schema(&json!({"short": {"max": 10.0, "min": 1}}), &registry).unwrap();
        assert_eq!(
            normalized(&loaded, &registry),
            json!({"number": {"max": 10, "min": 1}})
        );
    }

    #[test]
    fn bundle_keeps_named_root() {
        let registry = registry();
        let bundle = json!({
            "definitions": {"Flag": {"boolean": {"isTrue": true}}},
            "schema": "Flag"
        });
        let loaded = load_schema(&bundle, &registry).unwrap();
        assert_eq!(normalized(&loaded, &registry), bundle);
    }

    #[test]
    fn run_describe_prints_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, r#"{"string": {"email": true}}"#).unwrap();
        let args = DescribeArgs {
            schema: path,
            yaml: true,
        };
        assert_eq!(run_describe(&args, &registry()).unwrap(), 0);
    }

    #[test]
    fn normalizing_drops_the_optional_flag() {
        let registry = registry();
        let bundle = json!({
            "definitions": {"Person": {"object": {"properties": {
                "name": {"string": {}},
                "manager": {"ref": {"target": "Person", "optional": true}}
            }}}},
            "schema": "Person"
        });
        let loaded = load_schema(&bundle, &registry).unwrap();
        assert!(loaded.root.is_valid(&json!({"name": "A"})));

        let described = normalized(&loaded, &registry);
        assert_eq!(
            described["definitions"]["Person"]["object"]["properties"]["manager"],
            json!({"ref": {"target": "Person"}})
        );
        let reloaded = load_schema(&described, &registry).unwrap();
        assert!(!reloaded.root.is_valid(&json!({"name": "A"})));
    }
}
