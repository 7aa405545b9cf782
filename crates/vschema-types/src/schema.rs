//! # Schema
//!
//! [`Schema`] is the closed set of schema variants. Composite schemas hold
//! their children as `Schema`, the registry creates and caches `Schema`
//! values, and descriptor entries are applied to a `Schema` by name through
//! [`Schema::apply_constraint`].

use std::fmt;

use serde_json::Value;
use vschema_core::{ConstraintDescriptor, ConstraintInfo, SchemaError, ValidationContext};

use crate::base::{Constrained, Type, Validate};
use crate::boolean::{BooleanConstraint, BooleanType, BOOLEAN};
use crate::descriptor::expect_flag;
use crate::number::{NumberConstraint, NumberType};
use crate::object::{ObjectType, OBJECT};
use crate::reference::{ReferenceType, REF};
use crate::string::{StringConstraint, StringType, STRING};

/// Evaluate `$body` with `$node` bound to whichever variant `$schema` holds.
macro_rules! on_node {
    ($schema:expr, $node:ident => $body:expr) => {
        match $schema {
            Schema::String($node) => $body,
            Schema::Number($node) => $body,
            Schema::Boolean($node) => $body,
            Schema::Object($node) => $body,
            Schema::Reference($node) => $body,
        }
    };
}

/// Any schema node.
#[derive(Debug, Clone)]
pub enum Schema {
    String(StringType),
    Number(NumberType),
    Boolean(BooleanType),
    Object(ObjectType),
    Reference(ReferenceType),
}

impl Schema {
    /// The registered kind this schema was created as. Numeric subkinds
    /// report their own name (`"integer"`), unlike [`Type::base_type`].
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => STRING,
            Self::Number(n) => n.kind().as_str(),
            Self::Boolean(_) => BOOLEAN,
            Self::Object(_) => OBJECT,
            Self::Reference(_) => REF,
        }
    }

    pub fn to_descriptor(&self) -> Value {
        on_node!(self, node => node.to_descriptor())
    }

    /// Constraints this schema accepts, labelled with `type_name` (the
    /// kind it was registered under).
    pub fn catalog(&self, type_name: &str) -> Vec<ConstraintDescriptor> {
        match self {
            Self::String(_) => StringConstraint::catalog(type_name),
            Self::Number(_) => NumberConstraint::catalog(type_name),
            Self::Boolean(_) => BooleanConstraint::catalog(type_name),
            Self::Object(_) => ObjectType::catalog(type_name),
            Self::Reference(_) => ReferenceType::catalog(type_name),
        }
    }

    /// Apply one descriptor entry, e.g. `("min", 3)` or `("email", true)`.
    ///
    /// Flag constraints take `true`. Object properties and reference
    /// targets need a registry and are handled by `Registry::create`.
    pub fn apply_constraint(self, name: &str, arg: &Value) -> Result<Self, SchemaError> {
        match name {
            "required" => return expect_flag(name, arg).map(|()| self.required()),
            "optional" => return expect_flag(name, arg).map(|()| self.optional()),
            "nullable" => return expect_flag(name, arg).map(|()| self.nullable()),
            _ => {}
        }
        let kind = self.kind();
        let unknown = || SchemaError::UnknownConstraint {
            kind: kind.to_string(),
            constraint: name.to_string(),
        };
        let info = ConstraintInfo::default();
        match self {
            Self::String(s) => {
                let constraint = StringConstraint::from_descriptor(name, arg)?.ok_or_else(unknown)?;
                Ok(Self::String(s.constrain(constraint, info)))
            }
            Self::Number(n) => {
                let constraint = NumberConstraint::from_descriptor(name, arg)?.ok_or_else(unknown)?;
                Ok(Self::Number(n.constrain(constraint, info)))
            }
            Self::Boolean(b) => {
                let constraint =
                    BooleanConstraint::from_descriptor(name, arg)?.ok_or_else(unknown)?;
                Ok(Self::Boolean(b.constrain(constraint, info)))
            }
            Self::Object(_) | Self::Reference(_) => Err(unknown()),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceType> {
        match self {
            Self::Reference(r) => Some(r),
            _ => None,
        }
    }
}

impl Constrained for Schema {
    fn base(&self) -> &Type {
        on_node!(self, node => node.base())
    }

    fn base_mut(&mut self) -> &mut Type {
        on_node!(self, node => node.base_mut())
    }
}

impl Validate for Schema {
    fn check(&self, value: Option<&Value>, ctx: &mut ValidationContext) {
        on_node!(self, node => node.check(value, ctx))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        on_node!(self, node => fmt::Display::fmt(node, f))
    }
}

macro_rules! impl_from_node {
    ($($node:ty => $variant:ident),+ $(,)?) => {
        $(impl From<$node> for Schema {
            fn from(node: $node) -> Self {
                Self::$variant(node)
            }
        })+
    };
}

impl_from_node! {
    StringType => String,
    NumberType => Number,
    BooleanType => Boolean,
    ObjectType => Object,
    ReferenceType => Reference,
}
