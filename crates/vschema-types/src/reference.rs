//! # Reference Schema
//!
//! [`ReferenceType`] validates a JSON object against another schema that
//! may not exist yet when the reference is built. The target lives in a
//! [`Deferred`] slot, so a type can refer to itself or to a type declared
//! later; a patch fills the slot before validation needs it.
//!
//! The reference's own type test accepts objects and `null`. Whatever its
//! outcome, a present value is then handed to the target, so a non-object
//! also fails the target's own type test, even when the reference itself is
//! optional. Only an absent value skips the target.
//!
//! Checking a present value against a slot that was never filled records
//! a `ref`/`unresolved` violation rather than passing silently.
//!
//! The target is checked at the current path and the path is put back
//! afterwards, whatever the target does to it.
//!
//! ## Cycles
//!
//! A self-referencing schema holds an `Arc` to itself through its slot, so
//! it is never freed on its own, even after the registry is dropped. Call
//! [`Deferred::clear`] on the slot to break the cycle when the schema is no
//! longer needed.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use vschema_core::{
    shared_catalog, ConstraintDescriptor, ParamDescriptor, ParamKind, Params, ValidationContext,
    Violation,
};

use crate::base::{impl_constrained, Constrained, Type, Validate};
use crate::patch::Deferred;
use crate::schema::Schema;

/// Base type and test kind of references.
pub const REF: &str = "ref";

/// Descriptor key naming the registered target type.
pub const TARGET: &str = "target";

const TARGET_PARAMS: &[ParamDescriptor] = &[ParamDescriptor::new(TARGET, ParamKind::String)];

/// A late-bound reference to another schema.
#[derive(Clone)]
pub struct ReferenceType {
    base: Type,
    target: Deferred<Arc<Schema>>,
    target_name: Option<String>,
}

/// A reference to a schema that already exists.
pub fn reference(target: Arc<Schema>) -> ReferenceType {
    let target_name = target.name().map(str::to_string);
    ReferenceType {
        target_name,
        ..ReferenceType::deferred(Deferred::resolved(target))
    }
}

/// A reference whose target is filled into `slot` later.
pub fn reference_deferred(slot: Deferred<Arc<Schema>>) -> ReferenceType {
    ReferenceType::deferred(slot)
}

impl ReferenceType {
    fn deferred(target: Deferred<Arc<Schema>>) -> Self {
        Self {
            base: Type::with_literal_type(REF, |v| {
                v.is_some_and(|v| v.is_object() || v.is_null())
            }),
            target,
            target_name: None,
        }
    }

    /// A reference with an empty slot that nothing will fill unless the
    /// caller keeps a clone of [`ReferenceType::slot`].
    pub fn unbound() -> Self {
        Self::deferred(Deferred::new())
    }

    /// Record the registered name of the target, used by descriptors.
    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    /// The slot holding the target.
    pub fn slot(&self) -> &Deferred<Arc<Schema>> {
        &self.target
    }

    pub fn target(&self) -> Option<Arc<Schema>> {
        self.target.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_resolved()
    }

    /// `{ "ref": { <constraints>, "target": <name> } }`; the target is
    /// omitted when it has no registered name.
    pub fn to_descriptor(&self) -> Value {
        let mut constraints = self.base.constraint_map();
        if let Some(name) = &self.target_name {
            constraints.insert(TARGET.to_string(), Value::from(name.as_str()));
        }
        let mut descriptor = Params::new();
        descriptor.insert(REF.to_string(), Value::Object(constraints));
        Value::Object(descriptor)
    }

    pub fn catalog(type_name: &str) -> Vec<ConstraintDescriptor> {
        std::iter::once(ConstraintDescriptor {
            type_name: type_name.to_string(),
            name: TARGET,
            params: TARGET_PARAMS,
        })
        .chain(shared_catalog(type_name))
        .collect()
    }

    fn unresolved(&self, ctx: &ValidationContext, value: &Value) -> Violation {
        let mut params = Params::new();
        if let Some(name) = &self.target_name {
            params.insert(TARGET.to_string(), Value::from(name.as_str()));
        }
        Violation {
            kind: REF.to_string(),
            name: "unresolved".to_string(),
            params,
            path: ctx.path().to_string(),
            value: Some(value.clone()),
            message: Some("reference target has not been resolved".to_string()),
        }
    }
}

impl_constrained!(ReferenceType);

impl Validate for ReferenceType {
    fn check(&self, value: Option<&Value>, ctx: &mut ValidationContext) {
        self.base.run_tests(value, ctx);
        let Some(value) = value else {
            return;
        };
        match self.target.get() {
            Some(target) => {
                let path = ctx.path().to_string();
                target.check(Some(value), ctx);
                ctx.set_path(path);
            }
            None => {
                tracing::warn!(
                    path = %ctx.path(),
                    target = self.target_name.as_deref().unwrap_or("<anonymous>"),
                    "reference checked before its target was resolved"
                );
                let violation = self.unresolved(ctx, value);
                ctx.push(violation);
            }
        }
    }
}

// The target may point back at this reference; print names only.
impl fmt::Debug for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceType")
            .field("base", &self.base)
            .field("target_name", &self.target_name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)?;
        if let Some(name) = &self.target_name {
            write!(f, " -> {name}")?;
        }
        Ok(())
    }
}
