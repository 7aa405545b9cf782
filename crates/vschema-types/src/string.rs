//! # String Schema
//!
//! [`StringType`] accepts JSON strings. Lengths are counted in Unicode
//! scalar values, so `"héllo"` has length 5.
//!
//! `format` is informational: it is carried into descriptors and `Display`
//! but always passes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use vschema_core::{
    shared_catalog, ConstraintDescriptor, ConstraintInfo, ParamDescriptor, ParamKind, Params,
    SchemaError, Test,
};

use crate::base::{impl_scalar_node, Type};
use crate::descriptor::{arg_pattern, arg_string, arg_string_list, arg_usize, expect_flag};

/// Base type name of string schemas.
pub const STRING: &str = "string";

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

static EMAIL_RE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(EMAIL_PATTERN));

fn is_email(s: &str) -> bool {
    match EMAIL_RE.as_ref() {
        Ok(re) => re.is_match(s),
        Err(e) => {
            tracing::warn!(error = %e, "email pattern failed to compile");
            false
        }
    }
}

/// Lift a predicate over `&str` to one over optional JSON values. Anything
/// that is not a string fails.
fn on_str<F>(f: F) -> impl Fn(Option<&Value>) -> bool + Send + Sync + 'static
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    move |value: Option<&Value>| value.and_then(Value::as_str).is_some_and(|s| f(s))
}

/// A constraint a [`StringType`] accepts.
#[derive(Debug, Clone)]
pub enum StringConstraint {
    /// The value is one of the listed strings. Named `in` in descriptors.
    In(Vec<String>),
    /// Exact length.
    Length(usize),
    /// Minimum length, inclusive.
    Min(usize),
    /// Maximum length, inclusive.
    Max(usize),
    /// Non-blank after trimming whitespace.
    NonEmpty,
    /// An e-mail address.
    Email,
    /// The pattern matches somewhere in the value.
    Matches(Regex),
    /// Informational format name; always passes.
    Format(String),
}

const IN_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("values", ParamKind::StringList)];
const LENGTH_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("length", ParamKind::Integer)];
const MIN_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("min", ParamKind::Integer)];
const MAX_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("max", ParamKind::Integer)];
const MATCHES_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("re", ParamKind::Pattern)];
const FORMAT_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("format", ParamKind::String)];

const CATALOG: &[(&str, &[ParamDescriptor])] = &[
    ("in", IN_PARAMS),
    ("length", LENGTH_PARAMS),
    ("min", MIN_PARAMS),
    ("max", MAX_PARAMS),
    ("nonEmpty", &[]),
    ("email", &[]),
    ("matches", MATCHES_PARAMS),
    ("format", FORMAT_PARAMS),
];

impl StringConstraint {
    /// Constraint name as it appears in tests and descriptors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::In(_) => "in",
            Self::Length(_) => "length",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::NonEmpty => "nonEmpty",
            Self::Email => "email",
            Self::Matches(_) => "matches",
            Self::Format(_) => "format",
        }
    }

    pub fn params(&self) -> Params {
        let entry = match self {
            Self::In(values) => Some(("values", Value::from(values.clone()))),
            Self::Length(n) => Some(("length", Value::from(*n))),
            Self::Min(n) => Some(("min", Value::from(*n))),
            Self::Max(n) => Some(("max", Value::from(*n))),
            Self::Matches(re) => Some(("re", Value::from(re.as_str()))),
            Self::Format(format) => Some(("format", Value::from(format.as_str()))),
            Self::NonEmpty | Self::Email => None,
        };
        entry.into_iter().map(|(key, value)| (key.to_string(), value)).collect()
    }

    /// Build the test that enforces this constraint.
    pub fn into_test(self, info: ConstraintInfo) -> Test {
        let name = self.name();
        let params = self.params();
        let test = match self {
            Self::In(values) => Test::new(STRING, name, on_str(move |s| values.iter().any(|v| v == s))),
            Self::Length(n) => Test::new(STRING, name, on_str(move |s| s.chars().count() == n)),
            Self::Min(n) => Test::new(STRING, name, on_str(move |s| s.chars().count() >= n)),
            Self::Max(n) => Test::new(STRING, name, on_str(move |s| s.chars().count() <= n)),
            Self::NonEmpty => Test::new(STRING, name, on_str(|s| !s.trim().is_empty())),
            Self::Email => Test::new(STRING, name, on_str(is_email)),
            Self::Matches(re) => Test::new(STRING, name, on_str(move |s| re.is_match(s))),
            Self::Format(_) => Test::new(STRING, name, |_| true),
        };
        test.with_params(params).with_info(info)
    }

    /// Parse a descriptor entry such as `"min": 3` or `"email": true`.
    ///
    /// `Ok(None)` means the name is not a string constraint.
    pub fn from_descriptor(name: &str, arg: &Value) -> Result<Option<Self>, SchemaError> {
        let constraint = match name {
            "in" => Self::In(arg_string_list(name, arg)?),
            "length" => Self::Length(arg_usize(name, arg)?),
            "min" => Self::Min(arg_usize(name, arg)?),
            "max" => Self::Max(arg_usize(name, arg)?),
            "nonEmpty" => {
                expect_flag(name, arg)?;
                Self::NonEmpty
            }
            "email" => {
                expect_flag(name, arg)?;
                Self::Email
            }
            "matches" => Self::Matches(arg_pattern(name, arg)?),
            "format" => Self::Format(arg_string(name, arg)?),
            _ => return Ok(None),
        };
        Ok(Some(constraint))
    }

    /// Constraints of the string kind, followed by the shared ones.
    pub fn catalog(type_name: &str) -> Vec<ConstraintDescriptor> {
        CATALOG
            .iter()
            .map(|&(name, params)| ConstraintDescriptor {
                type_name: type_name.to_string(),
                name,
                params,
            })
            .chain(shared_catalog(type_name))
            .collect()
    }
}

/// Schema for JSON strings.
#[derive(Debug, Clone)]
pub struct StringType {
    base: Type,
}

/// A new, required string schema.
pub fn string() -> StringType {
    StringType::new()
}

impl StringType {
    pub fn new() -> Self {
        Self {
            base: Type::with_literal_type(STRING, |v| v.is_some_and(Value::is_string)),
        }
    }

    /// Append a typed constraint.
    pub fn constrain(mut self, constraint: StringConstraint, info: ConstraintInfo) -> Self {
        self.base.push(constraint.into_test(info));
        self
    }

    fn with(self, constraint: StringConstraint) -> Self {
        self.constrain(constraint, ConstraintInfo::default())
    }

    /// Value must equal one of `values`.
    pub fn one_of<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(StringConstraint::In(values.into_iter().map(Into::into).collect()))
    }

    pub fn length(self, n: usize) -> Self {
        self.with(StringConstraint::Length(n))
    }

    pub fn min(self, n: usize) -> Self {
        self.with(StringConstraint::Min(n))
    }

    pub fn max(self, n: usize) -> Self {
        self.with(StringConstraint::Max(n))
    }

    pub fn non_empty(self) -> Self {
        self.with(StringConstraint::NonEmpty)
    }

    pub fn email(self) -> Self {
        self.with(StringConstraint::Email)
    }

    /// Value must contain a match of `re`. Anchor the pattern for a full match.
    pub fn matches(self, re: Regex) -> Self {
        self.with(StringConstraint::Matches(re))
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.with(StringConstraint::Format(format.into()))
    }

    pub fn to_descriptor(&self) -> Value {
        self.base.to_descriptor()
    }
}

impl Default for StringType {
    fn default() -> Self {
        Self::new()
    }
}

impl_scalar_node!(StringType);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Constrained, Validate};
    use serde_json::json;

    fn names(err: &vschema_core::ValidationError) -> Vec<&str> {
        err.violations().iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn accepts_only_strings() {
        let s = string();
        assert!(s.is_valid(&json!("")));
        assert!(!s.is_valid(&json!(1)));
        assert!(!s.is_valid(&json!(null)));
        assert!(!s.is_valid(None));
    }

    #[test]
    fn wrong_type_short_circuits_every_constraint() {
        let err = string().min(3).email().validate(&json!(42)).unwrap_err();
        assert_eq!(names(&err), ["type"]);
        assert_eq!(err.violations()[0].params.get("type"), Some(&json!("string")));
    }

    #[test]
    fn optional_skips_absent_but_checks_present() {
        let s = string().optional().min(3);
        assert!(s.validate(None).is_ok());
        let err = s.validate(&json!("ab")).unwrap_err();
        assert_eq!(names(&err), ["min"]);
    }

    #[test]
    fn lengths_count_characters() {
        assert!(string().length(5).is_valid(&json!("héllo")));
        assert!(string().max(2).is_valid(&json!("日本")));
        assert!(!string().min(3).is_valid(&json!("日本")));
    }

    #[test]
    fn one_of_is_exact() {
        let s = string().one_of(["red", "green"]);
        assert!(s.is_valid(&json!("red")));
        assert!(!s.is_valid(&json!("Red")));
        assert_eq!(s.params_for("in").and_then(|p| p.get("values")), Some(&json!(["red", "green"])));
    }

    #[test]
    fn non_empty_trims_whitespace() {
        let s = string().non_empty();
        assert!(s.is_valid(&json!(" x ")));
        assert!(!s.is_valid(&json!("   ")));
        assert!(!s.is_valid(&json!("")));
    }

    #[test]
    fn email_matches_common_addresses() {
        let s = string().email();
        assert!(s.is_valid(&json!("a.b+tag@example.co.uk")));
        assert!(!s.is_valid(&json!("not an email")));
        assert!(!s.is_valid(&json!("a@-example.com")));
        assert!(!s.is_valid(&json!("@example.com")));
    }

    #[test]
    fn matches_searches_anywhere() {
        let s = string().matches(Regex::new("[0-9]+").unwrap());
        assert!(s.is_valid(&json!("abc123")));
        assert!(!s.is_valid(&json!("abc")));
        let anchored = string().matches(Regex::new("^[0-9]+$").unwrap());
        assert!(!anchored.is_valid(&json!("abc123")));
    }

    #[test]
    fn format_always_passes() {
        assert!(string().format("uuid").is_valid(&json!("anything")));
    }

    #[test]
    fn constraint_messages_reach_violations() {
        let s = string().constrain(StringConstraint::Min(3), ConstraintInfo::message("too short"));
        let err = s.validate(&json!("ab")).unwrap_err();
        assert_eq!(err.violations()[0].message.as_deref(), Some("too short"));
    }

    #[test]
    fn descriptor_and_display() {
        let s = string().min(3).one_of(["a", "b"]).email();
        assert_eq!(
            s.to_descriptor(),
            json!({"string": {"min": 3, "in": ["a", "b"], "email": true}})
        );
        assert_eq!(s.to_string(), "string min min=3 in values=a,b email");
    }

    #[test]
    fn from_descriptor_parses_and_rejects() {
        assert!(matches!(
            StringConstraint::from_descriptor("min", &json!(3)),
            Ok(Some(StringConstraint::Min(3)))
        ));
        assert!(matches!(
            StringConstraint::from_descriptor("email", &json!(true)),
            Ok(Some(StringConstraint::Email))
        ));
        assert!(StringConstraint::from_descriptor("min", &json!("3")).is_err());
        assert!(StringConstraint::from_descriptor("matches", &json!("(")).is_err());
        assert!(matches!(StringConstraint::from_descriptor("between", &json!(1)), Ok(None)));
    }

    #[test]
    fn catalog_lists_variant_then_shared_constraints() {
        let names: Vec<&str> = StringConstraint::catalog(STRING).iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            [
                "in", "length", "min", "max", "nonEmpty", "email", "matches", "format", "required",
                "optional", "nullable"
            ]
        );
    }
}
