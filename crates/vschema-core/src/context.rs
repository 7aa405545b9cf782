//! # Validation Context
//!
//! Mutable state threaded through one validation run: the property path of
//! the node currently being checked and the violations recorded so far.
//!
//! Paths are dotted (`address.street`) with bracketed indices
//! (`items[2].sku`). The root path is the empty string and renders as
//! `(root)`.
//!
//! Composite schemas extend the path with [`ValidationContext::enter`] before
//! descending and put it back with [`ValidationContext::restore`] afterwards,
//! so the caller-visible path is unchanged once control returns.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::test::{Params, Test};

/// A recorded test failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Kind of the failing test (its base type, or `"ref"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Name of the failing constraint.
    pub name: String,
    /// Parameters of the failing constraint.
    pub params: Params,
    /// Path of the offending value; empty for the root.
    pub path: String,
    /// The offending value; `None` when the value was absent.
    pub value: Option<Value>,
    /// Human message attached to the constraint, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Violation {
    /// Build a violation from a failing test.
    pub fn from_test(test: &Test, path: &str, value: Option<&Value>) -> Self {
        Self {
            kind: test.kind.clone(),
            name: test.name.clone(),
            params: test.params.clone(),
            path: path.to_string(),
            value: value.cloned(),
            message: test.message.clone(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            self.path.as_str()
        };
        write!(f, "  {path}: {}.{}", self.kind, self.name)?;
        if !self.params.is_empty() {
            write!(f, " {}", Value::Object(self.params.clone()))?;
        }
        match &self.value {
            Some(value) => write!(f, " (got {value})")?,
            None => write!(f, " (value absent)")?,
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Ordered collection of violations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for ValidationViolations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Visitor state for one validation run.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    path: String,
    violations: Vec<Violation>,
}

impl ValidationContext {
    /// A fresh context positioned at the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Overwrite the current path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Descend into a named property. Returns the previous path.
    pub fn enter(&mut self, property: &str) -> String {
        let next = if self.path.is_empty() {
            property.to_string()
        } else {
            format!("{}.{property}", self.path)
        };
        std::mem::replace(&mut self.path, next)
    }

    /// Descend into an array element. Returns the previous path.
    pub fn enter_index(&mut self, index: usize) -> String {
        let next = format!("{}[{index}]", self.path);
        std::mem::replace(&mut self.path, next)
    }

    /// Return to a path previously handed out by `enter`/`enter_index`.
    pub fn restore(&mut self, previous: String) {
        self.path = previous;
    }

    /// Record a failing test at the current path.
    pub fn record(&mut self, test: &Test, value: Option<&Value>) {
        tracing::trace!(
            path = %self.path,
            kind = %test.kind,
            constraint = %test.name,
            "constraint violated"
        );
        self.violations
            .push(Violation::from_test(test, &self.path, value));
    }

    /// Record a pre-built violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Violations recorded so far, in order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether nothing has been recorded.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consume the context, yielding its violations.
    pub fn into_violations(self) -> ValidationViolations {
        ValidationViolations::from(self.violations)
    }
}
