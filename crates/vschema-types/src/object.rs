//! # Object Schema
//!
//! [`ObjectType`] accepts JSON objects and checks each declared property
//! against its own schema. A property missing from the value is checked as
//! absent, so only optional property schemas tolerate it. Undeclared
//! properties are not inspected.
//!
//! Violations inside a property carry the dotted path to it
//! (`address.street`); the context path is restored after each property.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use vschema_core::{
    shared_catalog, ConstraintDescriptor, ParamDescriptor, ParamKind, Params, ValidationContext,
};

use crate::base::{impl_constrained, Type, Validate};
use crate::schema::Schema;

pub const OBJECT: &str = "object";

/// Descriptor key holding the property map.
pub const PROPERTIES: &str = "properties";

const PROPERTIES_PARAMS: &[ParamDescriptor] =
    &[ParamDescriptor::new(PROPERTIES, ParamKind::Properties)];

/// Schema for JSON objects with declared properties.
#[derive(Debug, Clone)]
pub struct ObjectType {
    base: Type,
    properties: IndexMap<String, Schema>,
}

pub fn object() -> ObjectType {
    ObjectType::new()
}

impl ObjectType {
    pub fn new() -> Self {
        Self {
            base: Type::with_literal_type(OBJECT, |v| v.is_some_and(Value::is_object)),
            properties: IndexMap::new(),
        }
    }

    /// Declare (or replace) a property.
    pub fn property(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.properties.insert(name.into(), schema.into());
        self
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> &IndexMap<String, Schema> {
        &self.properties
    }

    pub fn get(&self, property: &str) -> Option<&Schema> {
        self.properties.get(property)
    }

    /// `{ "object": { <constraints>, "properties": { <name>: <descriptor> } } }`.
    pub fn to_descriptor(&self) -> Value {
        let mut constraints = self.base.constraint_map();
        if !self.properties.is_empty() {
            let properties: Params = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_descriptor()))
                .collect();
            constraints.insert(PROPERTIES.to_string(), Value::Object(properties));
        }
        let mut descriptor = Params::new();
        descriptor.insert(OBJECT.to_string(), Value::Object(constraints));
        Value::Object(descriptor)
    }

    pub fn catalog(type_name: &str) -> Vec<ConstraintDescriptor> {
        std::iter::once(ConstraintDescriptor {
            type_name: type_name.to_string(),
            name: PROPERTIES,
            params: PROPERTIES_PARAMS,
        })
        .chain(shared_catalog(type_name))
        .collect()
    }
}

impl Default for ObjectType {
    fn default() -> Self {
        Self::new()
    }
}

impl_constrained!(ObjectType);

impl Validate for ObjectType {
    fn check(&self, value: Option<&Value>, ctx: &mut ValidationContext) {
        if !self.base.run_tests(value, ctx) {
            return;
        }
        let Some(Value::Object(map)) = value else {
            return;
        };
        for (name, schema) in &self.properties {
            let parent = ctx.enter(name);
            schema.check(map.get(name), ctx);
            ctx.restore(parent);
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)?;
        if self.properties.is_empty() {
            return Ok(());
        }
        f.write_str(" {")?;
        for (i, (name, schema)) in self.properties.iter().enumerate() {
            let sep = if i == 0 { "" } else { "," };
            write!(f, "{sep} {name}: {schema}")?;
        }
        f.write_str(" }")
    }
}
