//! # Base Schema Node
//!
//! [`Type`] is the state every schema variant shares: an optional name, the
//! base type discriminator, the ordered test list and a type-level message.
//!
//! ## Test List Invariant
//!
//! Index 0 always holds the literal-type test inserted at construction. It
//! breaks on failure, so nothing else runs against a value of the wrong type.
//! Constraints are appended after it and never removed. The only mutation
//! ever applied to an existing test is the `ignore` flag of test 0, which is
//! how [`Constrained::optional`] works.
//!
//! ## Descriptors
//!
//! [`Type::to_descriptor`] renders `{ <base_type>: { <name>: <arg>, .. } }`.
//! A test without params becomes `name: true`, a test with exactly one
//! param becomes `name: <value>`, anything else becomes `name: {params}`.
//! The literal-type test is skipped, so the optional flag does not survive
//! a round trip.

use std::fmt;

use serde_json::Value;
use vschema_core::{ConstraintInfo, Params, Test, ValidationContext, ValidationError};

/// Shared state of a schema node.
#[derive(Debug, Clone)]
pub struct Type {
    name: Option<String>,
    base_type: String,
    tests: Vec<Test>,
    message: Option<String>,
}

impl Type {
    /// A node whose literal-type test is `predicate`.
    pub fn with_literal_type(
        base_type: &str,
        predicate: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: None,
            base_type: base_type.to_string(),
            tests: vec![Test::literal_type(base_type, predicate)],
            message: None,
        }
    }

    /// The node's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// The discriminator, e.g. `"string"`.
    pub fn base_type(&self) -> &str {
        &self.base_type
    }

    /// Tests in evaluation order; index 0 is the literal-type test.
    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    /// The type-level message set by [`Constrained::error_message`].
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Append a test after every existing one.
    pub fn push(&mut self, test: Test) {
        self.tests.push(test);
    }

    /// Whether absent or wrong-typed values are skipped without a violation.
    pub fn is_optional(&self) -> bool {
        self.tests.first().is_some_and(|t| t.ignore)
    }

    pub(crate) fn set_optional(&mut self, optional: bool) {
        if let Some(literal) = self.tests.first_mut() {
            literal.ignore = optional;
        }
    }

    /// Params of the first test called `name`.
    pub fn params_for(&self, name: &str) -> Option<&Params> {
        self.tests.iter().find(|t| t.name == name).map(|t| &t.params)
    }

    /// Run every test in order against `value`.
    ///
    /// Returns `false` when a breaking test failed and evaluation stopped
    /// early, `true` when every test ran. Composite nodes only descend when
    /// this returns `true`.
    pub fn run_tests(&self, value: Option<&Value>, ctx: &mut ValidationContext) -> bool {
        for test in &self.tests {
            if test.check(value) {
                continue;
            }
            if !test.ignore {
                ctx.record(test, value);
            }
            if test.break_on_failure {
                return false;
            }
        }
        true
    }

    /// Constraint map of the descriptor, without the outer base-type key.
    pub fn constraint_map(&self) -> Params {
        let mut constraints = Params::new();
        for test in self.tests.iter().filter(|t| !t.is_literal_type()) {
            let arg = match test.params.len() {
                0 => Value::Bool(true),
                1 => test.params.values().next().cloned().unwrap_or(Value::Null),
                _ => Value::Object(test.params.clone()),
            };
            constraints.insert(test.name.clone(), arg);
        }
        constraints
    }

    /// `{ <base_type>: { <constraint>: <arg>, .. } }`.
    pub fn to_descriptor(&self) -> Value {
        let mut descriptor = Params::new();
        descriptor.insert(self.base_type.clone(), Value::Object(self.constraint_map()));
        Value::Object(descriptor)
    }
}

/// Renders a param value the way `Display` shows it: strings bare, arrays
/// comma-joined, everything else as JSON.
fn render_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_param).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_type)?;
        for test in self.tests.iter().filter(|t| !t.is_literal_type()) {
            write!(f, " {}", test.name)?;
            for (key, value) in &test.params {
                write!(f, " {key}={}", render_param(value))?;
            }
        }
        Ok(())
    }
}

/// Fluent operations shared by every schema variant.
///
/// Implementors only expose their [`Type`]; the builder methods consume and
/// return `self` so chains read `string().required().min(3)`.
pub trait Constrained: Sized {
    fn base(&self) -> &Type;

    fn base_mut(&mut self) -> &mut Type;

    /// Append a custom test.
    fn test(mut self, test: Test) -> Self {
        self.base_mut().push(test);
        self
    }

    /// Append a custom test with author-supplied settings.
    fn test_with(self, test: Test, info: ConstraintInfo) -> Self {
        self.test(test.with_info(info))
    }

    /// Name the node so it can be registered.
    fn named(mut self, name: impl Into<String>) -> Self {
        self.base_mut().set_name(name);
        self
    }

    /// Absent or wrong-typed values are violations. This is the default.
    fn required(mut self) -> Self {
        self.base_mut().set_optional(false);
        self
    }

    /// Absent or wrong-typed values stop evaluation without a violation.
    fn optional(mut self) -> Self {
        self.base_mut().set_optional(true);
        self
    }

    /// Same as [`Constrained::optional`].
    fn nullable(self) -> Self {
        self.optional()
    }

    /// Attach a type-level message. It is not consulted during validation.
    fn error_message(mut self, message: impl Into<String>) -> Self {
        self.base_mut().set_message(message);
        self
    }

    fn name(&self) -> Option<&str> {
        self.base().name()
    }

    fn params_for(&self, name: &str) -> Option<&Params> {
        self.base().params_for(name)
    }
}

/// Checking a value against a schema node.
pub trait Validate {
    /// Record every violation of `value` into `ctx`.
    fn check(&self, value: Option<&Value>, ctx: &mut ValidationContext);

    /// Check `value` in a fresh context. `None` is an absent value.
    fn validate<'a>(&self, value: impl Into<Option<&'a Value>>) -> Result<(), ValidationError>
    where
        Self: Sized,
    {
        let mut ctx = ValidationContext::new();
        self.check(value.into(), &mut ctx);
        if ctx.is_valid() {
            Ok(())
        } else {
            Err(ValidationError::new(ctx.into_violations()))
        }
    }

    /// Whether `value` conforms.
    fn is_valid<'a>(&self, value: impl Into<Option<&'a Value>>) -> bool
    where
        Self: Sized,
    {
        self.validate(value).is_ok()
    }
}

impl Validate for Type {
    fn check(&self, value: Option<&Value>, ctx: &mut ValidationContext) {
        self.run_tests(value, ctx);
    }
}

/// `Constrained` for a node that keeps its [`Type`] in a `base` field.
macro_rules! impl_constrained {
    ($node:ty) => {
        impl $crate::base::Constrained for $node {
            fn base(&self) -> &$crate::base::Type {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::base::Type {
                &mut self.base
            }
        }
    };
}

/// `Constrained`, `Validate` and `Display` for a scalar node: validation
/// is the test list alone and the display form is the base form.
macro_rules! impl_scalar_node {
    ($node:ty) => {
        $crate::base::impl_constrained!($node);

        impl $crate::base::Validate for $node {
            fn check(
                &self,
                value: Option<&serde_json::Value>,
                ctx: &mut vschema_core::ValidationContext,
            ) {
                self.base.run_tests(value, ctx);
            }
        }

        impl std::fmt::Display for $node {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.base, f)
            }
        }
    };
}

pub(crate) use impl_constrained;
pub(crate) use impl_scalar_node;
