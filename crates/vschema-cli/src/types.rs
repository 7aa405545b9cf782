//! # Types Subcommand
//!
//! Lists the kinds the registry can create and, with `--kind`, the
//! constraints a kind accepts together with their parameters.

use anyhow::{Context, Result};
use clap::Args;

use vschema_types::{ConstraintDescriptor, Registry};

/// Arguments for the `vschema types` subcommand.
#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Show the constraints of this kind instead of listing kinds.
    #[arg(long, short)]
    pub kind: Option<String>,
}

/// Render one constraint as `name(param: kind, ..)`, or just `name` for flags.
pub fn render_constraint(constraint: &ConstraintDescriptor) -> String {
    if constraint.is_flag() {
        return constraint.name.to_string();
    }
    let params: Vec<String> = constraint
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.kind))
        .collect();
    format!("{}({})", constraint.name, params.join(", "))
}

/// Execute the types subcommand.
pub fn run_types(args: &TypesArgs, registry: &Registry) -> Result<u8> {
    match &args.kind {
        None => {
            for name in registry.type_names() {
                println!("{name}");
            }
        }
        Some(kind) => {
            let constraints = registry
                .constraints(kind)
                .with_context(|| format!("cannot list constraints of '{kind}'"))?;
            println!("{kind}:");
            for constraint in &constraints {
                println!("  {}", render_constraint(constraint));
            }
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vschema_types::{FlushPolicy, RegistryConfig};

    fn registry() -> Registry {
        Registry::with_config(RegistryConfig {
            register_builtins: true,
            flush_policy: FlushPolicy::Manual,
        })
    }

    #[test]
    fn constraints_render_with_params() {
        let rendered: Vec<String> = registry()
            .constraints("string")
            .unwrap()
            .iter()
            .map(render_constraint)
            .collect();
        assert!(rendered.contains(&"min(min: integer)".to_string()));
        assert!(rendered.contains(&"email".to_string()));
        assert!(rendered.contains(&"required".to_string()));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let args = TypesArgs {
            kind: Some("date".into()),
        };
        assert!(run_types(&args, &registry()).is_err());
    }

    #[test]
    fn listing_kinds_succeeds() {
        let args = TypesArgs { kind: None };
        assert_eq!(run_types(&args, &registry()).unwrap(), 0);
    }
}
