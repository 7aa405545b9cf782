//! # vschema-core: Foundational Types for vschema
//!
//! This crate is the leaf of the vschema workspace. It defines the pieces a
//! validation run is made of, independent of any concrete schema kind:
//!
//! 1. **`Test`**: one atomic, named predicate over a value, carrying its
//!    parameters, an optional human message, and the `break`/`ignore` flags
//!    that drive short-circuit evaluation.
//!
//! 2. **`ValidationContext`**: the mutable visitor state threaded through a
//!    run: the current property path and the ordered list of violations.
//!
//! 3. **`Violation` / `ValidationError`**: the structured report handed back
//!    to callers. A violation always names the failing constraint, its
//!    parameters, the path and the offending value.
//!
//! 4. **`SchemaError`**: failures while *building* a schema (unknown kinds,
//!    unknown constraints, malformed descriptors).
//!
//! 5. **Constraint catalog**: static metadata describing which constraints a
//!    kind accepts and their parameters, for tooling that enumerates them.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vschema-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod catalog;
pub mod context;
pub mod error;
pub mod test;

// Re-export primary types for ergonomic imports.
pub use catalog::{shared_catalog, ConstraintDescriptor, ParamDescriptor, ParamKind};
pub use context::{ValidationContext, ValidationViolations, Violation};
pub use error::{SchemaError, ValidationError};
pub use test::{ConstraintInfo, Params, Predicate, Test, LITERAL_TYPE_TEST};
