//! # vschema-types: Schema Nodes, Descriptors and the Registry
//!
//! Builds on `vschema-core` to provide the schema kinds callers work with:
//!
//! - **Fluent builders**: [`string()`], [`number()`] and the numeric
//!   subkinds, [`boolean()`], [`object()`], [`reference()`]. Every builder
//!   starts with its literal-type test and appends constraints in call
//!   order: `string().required().min(3).email()`.
//!
//! - **Validation**: [`Validate::validate`] returns every violation of a
//!   value; [`Validate::is_valid`] answers yes or no.
//!
//! - **Descriptors**: `to_descriptor()` renders a schema as
//!   `{kind: {constraint: arg}}`; [`Registry::from_descriptor`] builds one
//!   back.
//!
//! - **Registry**: kind factories, named schemas and the deferred patch
//!   queue that resolves forward and circular references.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use vschema_types::{number, Validate};
//!
//! let percent = number().min(0).max(100);
//! assert!(percent.is_valid(&json!(42)));
//! let err = percent.validate(&json!(120)).unwrap_err();
//! assert_eq!(err.violations()[0].name, "max");
//! ```

pub mod base;
pub mod boolean;
pub mod config;
pub mod descriptor;
pub mod number;
pub mod object;
pub mod patch;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod string;

pub use base::{Constrained, Type, Validate};
pub use boolean::{boolean, BooleanConstraint, BooleanType};
pub use config::{ConfigError, FlushPolicy, RegistryConfig};
pub use descriptor::split_descriptor;
pub use number::{
    double, float, integer, long, number, short, NumberConstraint, NumberKind, NumberType,
};
pub use object::{object, ObjectType};
pub use patch::{Deferred, Patch, PatchQueue};
pub use reference::{reference, reference_deferred, ReferenceType};
pub use registry::{Factory, Registry};
pub use schema::Schema;
pub use string::{string, StringConstraint, StringType};

pub use vschema_core::{
    ConstraintDescriptor, ConstraintInfo, SchemaError, Test, ValidationContext, ValidationError,
    Violation,
};
