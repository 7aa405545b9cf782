//! # Constraint Tests
//!
//! A [`Test`] is the atomic unit of validation: a named predicate over a
//! value plus the metadata needed to report its failure.
//!
//! ## Evaluation Flags
//!
//! - `break_on_failure`: a failing test halts evaluation of every later
//!   test of the same schema node.
//! - `ignore`: a failing test is not recorded as a violation. It still
//!   breaks if `break_on_failure` is set.
//!
//! The literal-type test (name [`LITERAL_TYPE_TEST`]) sits at index 0 of
//! every schema node and always breaks. Toggling its `ignore` flag is how a
//! node becomes optional.
//!
//! Predicates receive `None` for an absent value (a missing property).
//! A predicate that panics is a bug in that constraint; the panic is not
//! caught.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the literal-type test inserted at index 0 of every schema node.
pub const LITERAL_TYPE_TEST: &str = "type";

/// Ordered constraint parameters, e.g. `{"min": 3}`.
pub type Params = Map<String, Value>;

/// A shareable predicate over an optional JSON value.
pub type Predicate = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// Optional per-constraint settings supplied by the schema author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintInfo {
    /// Human-readable message carried into every violation of the constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConstraintInfo {
    /// Info carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// One named predicate within a schema node.
#[derive(Clone)]
pub struct Test {
    /// Kind of the constraint, usually the base type it belongs to.
    pub kind: String,
    /// Constraint name, e.g. `"min"`.
    pub name: String,
    /// Constraint parameters in declaration order.
    pub params: Params,
    /// The predicate itself.
    pub predicate: Predicate,
    /// Halt the node's evaluation when this test fails.
    pub break_on_failure: bool,
    /// Do not record a violation when this test fails.
    pub ignore: bool,
    /// Optional human message.
    pub message: Option<String>,
}

impl Test {
    /// Create a test with no parameters and both flags cleared.
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        predicate: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            params: Params::new(),
            predicate: Arc::new(predicate),
            break_on_failure: false,
            ignore: false,
            message: None,
        }
    }

    /// The literal-type test for a base type.
    ///
    /// Named [`LITERAL_TYPE_TEST`], parameterized with `{"type": kind}` and
    /// always breaking.
    pub fn literal_type(
        kind: &str,
        predicate: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(kind, LITERAL_TYPE_TEST, predicate)
            .with_param("type", kind)
            .breaking()
    }

    /// Append one parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace all parameters.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Mark the test as break-on-failure.
    pub fn breaking(mut self) -> Self {
        self.break_on_failure = true;
        self
    }

    /// Mark the test as ignored.
    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Apply author-supplied settings.
    pub fn with_info(mut self, info: ConstraintInfo) -> Self {
        if info.message.is_some() {
            self.message = info.message;
        }
        self
    }

    /// Evaluate the predicate.
    pub fn check(&self, value: Option<&Value>) -> bool {
        (self.predicate)(value)
    }

    /// Whether this is the literal-type test of its node.
    pub fn is_literal_type(&self) -> bool {
        self.name == LITERAL_TYPE_TEST
    }
}

impl fmt::Debug for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("break_on_failure", &self.break_on_failure)
            .field("ignore", &self.ignore)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_test_has_flags_cleared() {
        let test = Test::new("string", "nonEmpty", |_| true);
        assert!(!test.break_on_failure);
        assert!(!test.ignore);
        assert!(test.params.is_empty());
        assert!(test.message.is_none());
    }

    #[test]
    fn literal_type_test_breaks_and_records_kind() {
        let test = Test::literal_type("number", |v| v.is_some_and(Value::is_number));
        assert!(test.is_literal_type());
        assert!(test.break_on_failure);
        assert_eq!(test.params.get("type"), Some(&json!("number")));
        assert!(test.check(Some(&json!(1))));
        assert!(!test.check(Some(&json!("1"))));
        assert!(!test.check(None));
    }

    #[test]
    fn params_keep_declaration_order() {
        let test = Test::new("number", "range", |_| true)
            .with_param("min", 1)
            .with_param("max", 5);
        let keys: Vec<&String> = test.params.keys().collect();
        assert_eq!(keys, ["min", "max"]);
    }

    #[test]
    fn info_message_is_applied() {
        let test = Test::new("string", "email", |_| false)
            .with_info(ConstraintInfo::message("not an address"));
        assert_eq!(test.message.as_deref(), Some("not an address"));
    }

    #[test]
    fn empty_info_keeps_existing_message() {
        let mut test = Test::new("string", "email", |_| false);
        test.message = Some("kept".into());
        let test = test.with_info(ConstraintInfo::default());
        assert_eq!(test.message.as_deref(), Some("kept"));
    }

    #[test]
    fn debug_omits_predicate() {
        let test = Test::new("boolean", "isTrue", |_| true);
        let rendered = format!("{test:?}");
        assert!(rendered.contains("isTrue"));
        assert!(rendered.contains(".."));
    }
}
