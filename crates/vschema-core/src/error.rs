//! # Error Types
//!
//! Two families, kept apart on purpose:
//!
//! - [`SchemaError`]: the schema itself could not be built: an unknown
//!   kind, an unknown constraint, a malformed argument or descriptor.
//! - [`ValidationError`]: the schema is fine but the value does not
//!   conform. It carries every violation of the run, in evaluation order.

use thiserror::Error;

use crate::context::{ValidationViolations, Violation};

/// Failure while building or registering a schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// No factory is registered for the requested kind.
    #[error("unknown type: {kind}")]
    UnknownType {
        /// The requested kind name.
        kind: String,
    },

    /// The kind has no constraint of that name.
    #[error("unknown constraint '{constraint}' for type '{kind}'")]
    UnknownConstraint {
        /// Kind of the schema the constraint was applied to.
        kind: String,
        /// The constraint name.
        constraint: String,
    },

    /// The constraint exists but its argument has the wrong shape.
    #[error("invalid argument for constraint '{constraint}': {reason}")]
    InvalidArgument {
        /// The constraint name.
        constraint: String,
        /// Why the argument was rejected.
        reason: String,
    },

    /// A descriptor document is structurally malformed.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Only named schemas can enter the named-instance cache.
    #[error("cannot register a schema without a name")]
    Unnamed,
}

/// The value did not conform to the schema.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("validation failed with {} violation(s):\n{violations}", .violations.len())]
pub struct ValidationError {
    /// Every violation recorded during the run.
    pub violations: ValidationViolations,
}

impl ValidationError {
    /// Wrap a non-empty violation list.
    pub fn new(violations: ValidationViolations) -> Self {
        Self { violations }
    }

    /// The recorded violations, in order.
    pub fn violations(&self) -> &[Violation] {
        self.violations.violations()
    }

    /// Consume the error, yielding its violations.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations.into_inner()
    }
}
