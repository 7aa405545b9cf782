//! # Number Schemas
//!
//! [`NumberType`] accepts JSON numbers. The subkinds `short`, `integer`,
//! `long`, `float` and `double` are registered under their own names but
//! behave exactly like `number`: no range or integrality is enforced beyond
//! the constraints the author adds. Every subkind reports base type
//! `"number"`.
//!
//! `format`, `precision` and `scale` are informational. They appear in
//! descriptors and `Display` but always pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vschema_core::{
    shared_catalog, ConstraintDescriptor, ConstraintInfo, ParamDescriptor, ParamKind, Params,
    SchemaError, Test,
};

use crate::base::{impl_scalar_node, Type};
use crate::descriptor::{arg_f64, arg_string, arg_u32, number_value};

/// Base type name shared by every numeric kind.
pub const NUMBER: &str = "number";

/// The registered numeric kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    #[default]
    Number,
    Short,
    Integer,
    Long,
    Float,
    Double,
}

impl NumberKind {
    pub const ALL: [NumberKind; 6] = [
        Self::Number,
        Self::Short,
        Self::Integer,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    /// Kind name as registered.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Short => "short",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumberKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownType { kind: s.to_string() })
    }
}

fn on_f64<F>(f: F) -> impl Fn(Option<&Value>) -> bool + Send + Sync + 'static
where
    F: Fn(f64) -> bool + Send + Sync + 'static,
{
    move |value: Option<&Value>| value.and_then(Value::as_f64).is_some_and(|n| f(n))
}

/// A constraint a [`NumberType`] accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberConstraint {
    /// `value >= min`.
    Min(f64),
    /// `value <= max`.
    Max(f64),
    /// `value < bound`.
    LessThan(f64),
    /// `value <= bound`.
    LessThanEquals(f64),
    /// `value > bound`.
    GreaterThan(f64),
    /// `value >= bound`.
    GreaterThanEquals(f64),
    Format(String),
    Precision(u32),
    Scale(u32),
}

const MIN_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("min", ParamKind::Number)];
const MAX_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("max", ParamKind::Number)];
const BOUND_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("number", ParamKind::Number)];
const FORMAT_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("format", ParamKind::String)];
const PRECISION_PARAMS: &[ParamDescriptor] =
    &[ParamDescriptor::new("precision", ParamKind::Integer)];
const SCALE_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new("scale", ParamKind::Integer)];

const CATALOG: &[(&str, &[ParamDescriptor])] = &[
    ("min", MIN_PARAMS),
    ("max", MAX_PARAMS),
    ("lessThan", BOUND_PARAMS),
    ("lessThanEquals", BOUND_PARAMS),
    ("greaterThan", BOUND_PARAMS),
    ("greaterThanEquals", BOUND_PARAMS),
    ("format", FORMAT_PARAMS),
    ("precision", PRECISION_PARAMS),
    ("scale", SCALE_PARAMS),
];

impl NumberConstraint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::LessThan(_) => "lessThan",
            Self::LessThanEquals(_) => "lessThanEquals",
            Self::GreaterThan(_) => "greaterThan",
            Self::GreaterThanEquals(_) => "greaterThanEquals",
            Self::Format(_) => "format",
            Self::Precision(_) => "precision",
            Self::Scale(_) => "scale",
        }
    }

    pub fn params(&self) -> Params {
        let (key, value) = match self {
            Self::Min(n) => ("min", number_value(*n)),
            Self::Max(n) => ("max", number_value(*n)),
            Self::LessThan(n)
            | Self::LessThanEquals(n)
            | Self::GreaterThan(n)
            | Self::GreaterThanEquals(n) => ("number", number_value(*n)),
            Self::Format(format) => ("format", Value::from(format.as_str())),
            Self::Precision(p) => ("precision", Value::from(*p)),
            Self::Scale(s) => ("scale", Value::from(*s)),
        };
        let mut params = Params::new();
        params.insert(key.to_string(), value);
        params
    }

    pub fn into_test(self, info: ConstraintInfo) -> Test {
        let name = self.name();
        let params = self.params();
        let test = match self {
            Self::Min(min) => Test::new(NUMBER, name, on_f64(move |n| n >= min)),
            Self::Max(max) => Test::new(NUMBER, name, on_f64(move |n| n <= max)),
            Self::LessThan(b) => Test::new(NUMBER, name, on_f64(move |n| n < b)),
            Self::LessThanEquals(b) => Test::new(NUMBER, name, on_f64(move |n| n <= b)),
            Self::GreaterThan(b) => Test::new(NUMBER, name, on_f64(move |n| n > b)),
            Self::GreaterThanEquals(b) => Test::new(NUMBER, name, on_f64(move |n| n >= b)),
            Self::Format(_) | Self::Precision(_) | Self::Scale(_) => {
                Test::new(NUMBER, name, |_| true)
            }
        };
        test.with_params(params).with_info(info)
    }

    /// Parse a descriptor entry. `Ok(None)` means the name is not a number
    /// constraint.
    pub fn from_descriptor(name: &str, arg: &Value) -> Result<Option<Self>, SchemaError> {
        let constraint = match name {
            "min" => Self::Min(arg_f64(name, arg)?),
            "max" => Self::Max(arg_f64(name, arg)?),
            "lessThan" => Self::LessThan(arg_f64(name, arg)?),
            "lessThanEquals" => Self::LessThanEquals(arg_f64(name, arg)?),
            "greaterThan" => Self::GreaterThan(arg_f64(name, arg)?),
            "greaterThanEquals" => Self::GreaterThanEquals(arg_f64(name, arg)?),
            "format" => Self::Format(arg_string(name, arg)?),
            "precision" => Self::Precision(arg_u32(name, arg)?),
            "scale" => Self::Scale(arg_u32(name, arg)?),
            _ => return Ok(None),
        };
        Ok(Some(constraint))
    }

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

/// Schema for JSON numbers.
#[derive(Debug, Clone)]
pub struct NumberType {
    base: Type,
    kind: NumberKind,
}

pub fn number() -> NumberType {
    NumberType::of_kind(NumberKind::Number)
}

pub fn short() -> NumberType {
    NumberType::of_kind(NumberKind::Short)
}

pub fn integer() -> NumberType {
    NumberType::of_kind(NumberKind::Integer)
}

pub fn long() -> NumberType {
    NumberType::of_kind(NumberKind::Long)
}

pub fn float() -> NumberType {
    NumberType::of_kind(NumberKind::Float)
}

pub fn double() -> NumberType {
    NumberType::of_kind(NumberKind::Double)
}

impl NumberType {
    pub fn of_kind(kind: NumberKind) -> Self {
        Self {
            base: Type::with_literal_type(NUMBER, |v| v.is_some_and(Value::is_number)),
            kind,
        }
    }

    /// The kind this schema was created as.
    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn constrain(mut self, constraint: NumberConstraint, info: ConstraintInfo) -> Self {
        self.base.push(constraint.into_test(info));
        self
    }

    fn with(self, constraint: NumberConstraint) -> Self {
        self.constrain(constraint, ConstraintInfo::default())
    }

    pub fn min(self, min: impl Into<f64>) -> Self {
        self.with(NumberConstraint::Min(min.into()))
    }

    pub fn max(self, max: impl Into<f64>) -> Self {
        self.with(NumberConstraint::Max(max.into()))
    }

    pub fn less_than(self, bound: impl Into<f64>) -> Self {
        self.with(NumberConstraint::LessThan(bound.into()))
    }

    pub fn less_than_equals(self, bound: impl Into<f64>) -> Self {
        self.with(NumberConstraint::LessThanEquals(bound.into()))
    }

    pub fn greater_than(self, bound: impl Into<f64>) -> Self {
        self.with(NumberConstraint::GreaterThan(bound.into()))
    }

    pub fn greater_than_equals(self, bound: impl Into<f64>) -> Self {
        self.with(NumberConstraint::GreaterThanEquals(bound.into()))
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.with(NumberConstraint::Format(format.into()))
    }

    pub fn precision(self, precision: u32) -> Self {
        self.with(NumberConstraint::Precision(precision))
    }

    pub fn scale(self, scale: u32) -> Self {
        self.with(NumberConstraint::Scale(scale))
    }

    pub fn to_descriptor(&self) -> Value {
        self.base.to_descriptor()
    }
}

impl Default for NumberType {
    fn default() -> Self {
        number()
    }
}

impl_scalar_node!(NumberType);
