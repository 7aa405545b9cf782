//! # Validate Subcommand
//!
//! Checks one or more JSON/YAML documents against a schema file and reports
//! every violation per document.
//!
//! ## Exit Codes
//!
//! - `0`: every document conforms.
//! - `1`: at least one document has violations.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use vschema_types::{Registry, Schema, Validate, Violation};

use crate::schema_file::load_schema_file;

/// Arguments for the `vschema validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file: a descriptor, or a bundle of definitions plus a root.
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Documents to validate (JSON, or YAML by `.yaml`/`.yml` extension).
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Report format.
    #[arg(long, default_value = "text")]
    pub format: ReportFormat,
}

/// How validation results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One PASS/FAIL line per document, violations indented below.
    Text,
    /// A JSON array of per-document reports.
    Json,
}

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub document: PathBuf,
    pub valid: bool,
    pub violations: Vec<Violation>,
}

/// Validate the document at `path` against `schema`.
pub fn check_document(schema: &Schema, path: &Path) -> Result<DocumentReport> {
    let value = crate::load_document(path)?;
    let violations = match schema.validate(&value) {
        Ok(()) => Vec::new(),
        Err(err) => err.into_violations(),
    };
    tracing::debug!(
        document = %path.display(),
        violations = violations.len(),
        "validated document"
    );
    Ok(DocumentReport {
        document: path.to_path_buf(),
        valid: violations.is_empty(),
        violations,
    })
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, registry: &Registry) -> Result<u8> {
    let loaded = load_schema_file(&args.schema, registry)?;
    tracing::info!(schema = %loaded.root, "loaded schema");

    let reports = args
        .documents
        .iter()
        .map(|path| check_document(&loaded.root, path))
        .collect::<Result<Vec<_>>>()?;

    match args.format {
        ReportFormat::Text => {
            for report in &reports {
                if report.valid {
                    println!("PASS {}", report.document.display());
                } else {
                    println!("FAIL {}", report.document.display());
                    for violation in &report.violations {
                        println!("{violation}");
                    }
                }
            }
            let failed = reports.iter().filter(|r| !r.valid).count();
            println!();
            println!("{} document(s), {failed} failed", reports.len());
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    Ok(if reports.iter().all(|r| r.valid) { 0 } else { 1 })
}
