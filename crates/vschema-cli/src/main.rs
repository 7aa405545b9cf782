//! # vschema CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vschema_cli::cli_registry;
use vschema_cli::describe::{run_describe, DescribeArgs};
use vschema_cli::types::{run_types, TypesArgs};
use vschema_cli::validate::{run_validate, ValidateArgs};

/// Declarative validation of JSON and YAML documents.
#[derive(Parser, Debug)]
#[command(name = "vschema", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate documents against a schema file.
    Validate(ValidateArgs),

    /// Print the normalized descriptor of a schema file.
    Describe(DescribeArgs),

    /// List schema kinds and their constraints.
    Types(TypesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = cli_registry().and_then(|registry| match &cli.command {
        Commands::Validate(args) => run_validate(args, &registry),
        Commands::Describe(args) => run_describe(args, &registry),
        Commands::Types(args) => run_types(args, &registry),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vschema_cli::validate::ReportFormat;

    #[test]
    fn cli_parse_validate() {
        let cli =
            Cli::try_parse_from(["vschema", "validate", "--schema", "s.yaml", "a.json", "b.yaml"])
                .unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.schema, PathBuf::from("s.yaml"));
        assert_eq!(args.documents.len(), 2);
        assert_eq!(args.format, ReportFormat::Text);
    }

    #[test]
    fn cli_parse_validate_json_format() {
        let cli = Cli::try_parse_from([
            "vschema", "validate", "-s", "s.json", "--format", "json", "a.json",
        ])
        .unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.format, ReportFormat::Json);
    }

    #[test]
    fn cli_validate_requires_documents() {
        assert!(Cli::try_parse_from(["vschema", "validate", "--schema", "s.json"]).is_err());
    }

    #[test]
    fn cli_parse_describe_yaml() {
        let cli = Cli::try_parse_from(["vschema", "describe", "--schema", "s.json", "--yaml"]).unwrap();
        let Commands::Describe(args) = cli.command else {
            panic!("expected describe");
        };
        assert!(args.yaml);
    }

    #[test]
    fn cli_parse_types_with_kind() {
        let cli = Cli::try_parse_from(["vschema", "-vv", "types", "--kind", "integer"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Types(args) = cli.command else {
            panic!("expected types");
        };
        assert_eq!(args.kind.as_deref(), Some("integer"));
    }

    #[test]
    fn cli_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["vschema", "lint"]).is_err());
    }
}
