//! # vschema-cli: Command-Line Interface for vschema
//!
//! Provides the `vschema` binary.
//!
//! ## Subcommands
//!
//! - `vschema validate`: check JSON/YAML documents against a schema file.
//! - `vschema describe`: print a schema file's normalized descriptor.
//! - `vschema types`: list registered kinds and the constraints they take.
//!
//! ```bash
//! vschema validate --schema person.schema.yaml alice.json bob.yaml
//! vschema describe --schema person.schema.yaml
//! vschema types --kind string
//! ```
//!
//! ## Schema Files
//!
//! A schema file (JSON or YAML) is either a single descriptor:
//!
//! ```yaml
//! object:
//!   properties:
//!     name: { string: { nonEmpty: true } }
//!     age: { integer: { min: 0, optional: true } }
//! ```
//!
//! or a bundle of named definitions plus the root schema, which may be a
//! descriptor or the name of a definition. Definitions can refer to each
//! other, and to themselves, with `ref: { target: <name> }`:
//!
//! ```yaml
//! definitions:
//!   Person:
//!     object:
//!       properties:
//!         name: { string: {} }
//!         manager: { ref: { target: Person, optional: true } }
//! schema: Person
//! ```

pub mod describe;
pub mod schema_file;
pub mod types;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use vschema_types::{FlushPolicy, Registry, RegistryConfig};

/// Read a JSON or YAML document. Files ending in `.yaml`/`.yml` are parsed
/// as YAML, everything else as JSON.
pub fn load_document(path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML in {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))
    }
}

/// The registry the CLI builds schemas in.
///
/// Honors `VSCHEMA_REGISTER_BUILTINS`; flushing is always manual because
/// the CLI runs without an async runtime and flushes after loading.
pub fn cli_registry() -> Result<Registry> {
    let config = RegistryConfig::from_env().context("invalid vschema environment configuration")?;
    Ok(Registry::with_config(RegistryConfig {
        flush_policy: FlushPolicy::Manual,
        ..config
    }))
}
