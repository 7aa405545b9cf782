//! # Boolean Schema

use serde_json::Value;
use vschema_core::{shared_catalog, ConstraintDescriptor, ConstraintInfo, SchemaError, Test};

use crate::base::{impl_scalar_node, Type};
use crate::descriptor::expect_flag;

pub const BOOLEAN: &str = "boolean";

/// A constraint a [`BooleanType`] accepts. Both compare strictly: a truthy
/// non-boolean never satisfies `isTrue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanConstraint {
    IsTrue,
    IsFalse,
}

impl BooleanConstraint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::IsTrue => "isTrue",
            Self::IsFalse => "isFalse",
        }
    }

    fn expected(&self) -> bool {
        matches!(self, Self::IsTrue)
    }

    pub fn into_test(self, info: ConstraintInfo) -> Test {
        let expected = self.expected();
        Test::new(BOOLEAN, self.name(), move |v| v.and_then(Value::as_bool) == Some(expected))
            .with_info(info)
    }

    pub fn from_descriptor(name: &str, arg: &Value) -> Result<Option<Self>, SchemaError> {
        let constraint = match name {
            "isTrue" => Self::IsTrue,
            "isFalse" => Self::IsFalse,
            _ => return Ok(None),
        };
        expect_flag(name, arg)?;
        Ok(Some(constraint))
    }

    pub fn catalog(type_name: &str) -> Vec<ConstraintDescriptor> {
        [Self::IsTrue, Self::IsFalse]
            .into_iter()
            .map(|c| ConstraintDescriptor {
                type_name: type_name.to_string(),
                name: c.name(),
                params: &[],
            })
            .chain(shared_catalog(type_name))
            .collect()
    }
}

/// Schema for JSON booleans.
#[derive(Debug, Clone)]
pub struct BooleanType {
    base: Type,
}

pub fn boolean() -> BooleanType {
    BooleanType::new()
}

impl BooleanType {
    pub fn new() -> Self {
        Self {
            base: Type::with_literal_type(BOOLEAN, |v| v.is_some_and(Value::is_boolean)),
        }
    }

    pub fn constrain(mut self, constraint: BooleanConstraint, info: ConstraintInfo) -> Self {
        self.base.push(constraint.into_test(info));
        self
    }

    pub fn is_true(self) -> Self {
        self.constrain(BooleanConstraint::IsTrue, ConstraintInfo::default())
    }

    pub fn is_false(self) -> Self {
        self.constrain(BooleanConstraint::IsFalse, ConstraintInfo::default())
    }

    pub fn to_descriptor(&self) -> Value {
        self.base.to_descriptor()
    }
}

impl Default for BooleanType {
    fn default() -> Self {
        Self::new()
    }
}

impl_scalar_node!(BooleanType);
