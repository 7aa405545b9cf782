//! # Descriptor Arguments
//!
//! Helpers that turn the argument of a descriptor entry (`"min": 3`,
//! `"in": ["a", "b"]`, `"email": true`) into the typed value a constraint
//! needs, reporting [`SchemaError::InvalidArgument`] when the shape is wrong.

use regex::Regex;
use serde_json::{Number, Value};
use vschema_core::{Params, SchemaError};

fn invalid(constraint: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidArgument {
        constraint: constraint.to_string(),
        reason: reason.into(),
    }
}

/// Flag constraints are written `name: true`.
pub(crate) fn expect_flag(constraint: &str, arg: &Value) -> Result<(), SchemaError> {
    match arg {
        Value::Bool(true) => Ok(()),
        other => Err(invalid(constraint, format!("expected `true`, got {other}"))),
    }
}

pub(crate) fn arg_f64(constraint: &str, arg: &Value) -> Result<f64, SchemaError> {
    arg.as_f64()
        .ok_or_else(|| invalid(constraint, format!("expected a number, got {arg}")))
}

pub(crate) fn arg_usize(constraint: &str, arg: &Value) -> Result<usize, SchemaError> {
    arg.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| invalid(constraint, format!("expected a non-negative integer, got {arg}")))
}

pub(crate) fn arg_u32(constraint: &str, arg: &Value) -> Result<u32, SchemaError> {
    arg.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(constraint, format!("expected a non-negative integer, got {arg}")))
}

pub(crate) fn arg_string(constraint: &str, arg: &Value) -> Result<String, SchemaError> {
    arg.as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(constraint, format!("expected a string, got {arg}")))
}

pub(crate) fn arg_string_list(constraint: &str, arg: &Value) -> Result<Vec<String>, SchemaError> {
    let items = arg
        .as_array()
        .ok_or_else(|| invalid(constraint, format!("expected an array of strings, got {arg}")))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(constraint, format!("expected a string element, got {item}")))
        })
        .collect()
}

pub(crate) fn arg_pattern(constraint: &str, arg: &Value) -> Result<Regex, SchemaError> {
    let source = arg_string(constraint, arg)?;
    Regex::new(&source).map_err(|e| invalid(constraint, e.to_string()))
}

/// A bound as it appears in params. Integral values stay integers so
/// `{"min": 0}` survives a round trip unchanged.
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Split a descriptor `{ <kind>: <constraints> }` into its kind and
/// constraint map. `null` constraints count as none.
pub fn split_descriptor(descriptor: &Value) -> Result<(&str, Option<&Params>), SchemaError> {
    let map = descriptor.as_object().ok_or_else(|| {
        SchemaError::InvalidDescriptor(format!("expected an object, got {descriptor}"))
    })?;
    let mut entries = map.iter();
    let (kind, constraints) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(SchemaError::InvalidDescriptor(format!(
                "expected exactly one type key, got {}",
                map.len()
            )))
        }
    };
    match constraints {
        Value::Null => Ok((kind, None)),
        Value::Object(constraints) => Ok((kind, Some(constraints))),
        other => Err(SchemaError::InvalidDescriptor(format!(
            "constraints of '{kind}' must be an object, got {other}"
        ))),
    }
}
