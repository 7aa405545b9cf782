//! # Registry
//!
//! The registry owns everything that was process-wide state in earlier
//! designs of this engine: the factories that build a schema for a kind
//! name, the cache of named schema instances, and the deferred patch queue.
//! It is an explicit, cloneable handle; clones share the same state.
//!
//! ## Descriptors
//!
//! [`Registry::create`] builds a schema from a kind name and a constraint
//! map, and [`Registry::from_descriptor`] from a full `{kind: {..}}`
//! descriptor, the inverse of `to_descriptor`. Two entries need the
//! registry itself: `properties` of an object (each value is a nested
//! descriptor) and `target` of a reference (the name of a registered type,
//! bound through a patch so it may be registered later).
//!
//! ## Flushing
//!
//! Patches run when the queue is flushed. A flush is scheduled by the first
//! patch after the previous flush and run per [`FlushPolicy`]; [`Registry::get`]
//! always flushes synchronously first, so a lookup sees every registration
//! enqueued before it, including one whose patch another thread is running
//! at that moment.
//!
//! ## Locking
//!
//! The maps are guarded by `parking_lot` locks that are never held while a
//! factory or patch runs, so both may call back into the registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use vschema_core::{ConstraintDescriptor, Params, SchemaError};

use crate::base::Constrained;
use crate::boolean::{boolean, BOOLEAN};
use crate::config::{FlushPolicy, RegistryConfig};
use crate::descriptor::{arg_string, split_descriptor};
use crate::number::{NumberKind, NumberType};
use crate::object::{object, OBJECT, PROPERTIES};
use crate::patch::{Deferred, Patch, PatchQueue};
use crate::reference::{ReferenceType, REF, TARGET};
use crate::schema::Schema;
use crate::string::{string, STRING};

/// Builds a fresh, unconstrained schema for a kind.
pub type Factory = Arc<dyn Fn() -> Schema + Send + Sync>;

struct Inner {
    config: RegistryConfig,
    factories: RwLock<IndexMap<String, Factory>>,
    cache: RwLock<HashMap<String, Arc<Schema>>>,
    patches: PatchQueue,
}

/// Shared handle to factories, named schemas and pending patches.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Registry {
    /// A registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let register_builtins = config.register_builtins;
        let registry = Self {
            inner: Arc::new(Inner {
                config,
                factories: RwLock::new(IndexMap::new()),
                cache: RwLock::new(HashMap::new()),
                patches: PatchQueue::new(),
            }),
        };
        if register_builtins {
            registry.register_builtin_types();
        }
        registry
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Register factories for `string`, every numeric kind, `boolean`,
    /// `object` and `ref`.
    pub fn register_builtin_types(&self) {
        self.register_factory(STRING, || string().into());
        for kind in NumberKind::ALL {
            self.register_factory(kind.as_str(), move || NumberType::of_kind(kind).into());
        }
        self.register_factory(BOOLEAN, || boolean().into());
        self.register_factory(OBJECT, || object().into());
        self.register_factory(REF, || ReferenceType::unbound().into());
    }

    /// Register the factory for `kind`, replacing any earlier one.
    pub fn register_factory(
        &self,
        kind: impl Into<String>,
        factory: impl Fn() -> Schema + Send + Sync + 'static,
    ) {
        let kind = kind.into();
        tracing::debug!(kind = %kind, "registering type factory");
        self.inner.factories.write().insert(kind, Arc::new(factory));
    }

    /// Registered kind names in registration order.
    pub fn type_names(&self) -> Vec<String> {
        self.inner.factories.read().keys().cloned().collect()
    }

    fn factory(&self, kind: &str) -> Result<Factory, SchemaError> {
        self.inner
            .factories
            .read()
            .get(kind)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType {
                kind: kind.to_string(),
            })
    }

    /// Constraints accepted by `kind`: its own first, then
    /// `required`/`optional`/`nullable`.
    pub fn constraints(&self, kind: &str) -> Result<Vec<ConstraintDescriptor>, SchemaError> {
        let factory = self.factory(kind)?;
        Ok(factory().catalog(kind))
    }

    /// Build a schema of `kind` with the given constraint map.
    ///
    /// Each entry applies one constraint: `true` for flag constraints,
    /// otherwise the constraint's single argument. `None` and `null` mean
    /// no constraints.
    pub fn create(&self, kind: &str, constraints: Option<&Value>) -> Result<Schema, SchemaError> {
        match constraints {
            None | Some(Value::Null) => self.build(kind, None),
            Some(Value::Object(map)) => self.build(kind, Some(map)),
            Some(other) => Err(SchemaError::InvalidDescriptor(format!(
                "constraints of '{kind}' must be an object, got {other}"
            ))),
        }
    }

    /// Build a schema from `{ <kind>: { <constraint>: <arg>, .. } }`.
    pub fn from_descriptor(&self, descriptor: &Value) -> Result<Schema, SchemaError> {
        let (kind, constraints) = split_descriptor(descriptor)?;
        self.build(kind, constraints)
    }

    fn build(&self, kind: &str, constraints: Option<&Params>) -> Result<Schema, SchemaError> {
        let factory = self.factory(kind)?;
        let mut schema = factory();
        for (name, arg) in constraints.into_iter().flatten() {
            schema = self.apply(schema, name, arg)?;
        }
        tracing::trace!(kind, schema = %schema, "created schema");
        Ok(schema)
    }

    fn apply(&self, schema: Schema, name: &str, arg: &Value) -> Result<Schema, SchemaError> {
        match (schema, name) {
            (Schema::Object(mut object), PROPERTIES) => {
                let properties = arg.as_object().ok_or_else(|| SchemaError::InvalidArgument {
                    constraint: PROPERTIES.to_string(),
                    reason: format!("expected a map of property descriptors, got {arg}"),
                })?;
                for (property, descriptor) in properties {
                    object = object.property(property.clone(), self.from_descriptor(descriptor)?);
                }
                Ok(Schema::Object(object))
            }
            (Schema::Reference(reference), TARGET) => {
                let target = arg_string(TARGET, arg)?;
                Ok(Schema::Reference(self.bind(reference, &target)))
            }
            (schema, _) => schema.apply_constraint(name, arg),
        }
    }

    /// A reference to the registered type `name`, resolved at the next flush.
    pub fn reference(&self, name: &str) -> ReferenceType {
        self.bind(ReferenceType::unbound(), name)
    }

    fn bind(&self, reference: ReferenceType, name: &str) -> ReferenceType {
        let slot = reference.slot().clone();
        let registry = self.clone();
        let target = name.to_string();
        self.enqueue(Patch::from_fn(format!("{REF}:{name}"), move || {
            match registry.get(&target) {
                Some(schema) => slot.set(schema),
                None => tracing::warn!(
                    type_name = %target,
                    "no type registered under this name; reference stays unresolved"
                ),
            }
        }));
        reference.with_target_name(name)
    }

    /// Add a named schema to the cache, replacing any schema of that name.
    pub fn register(&self, schema: impl Into<Schema>) -> Result<Arc<Schema>, SchemaError> {
        self.register_shared(Arc::new(schema.into()))
    }

    /// Like [`Registry::register`] for a schema that is already shared, e.g.
    /// one a [`Deferred`] slot also points at.
    pub fn register_shared(&self, schema: Arc<Schema>) -> Result<Arc<Schema>, SchemaError> {
        let name = schema.name().ok_or(SchemaError::Unnamed)?.to_string();
        tracing::debug!(name = %name, kind = schema.kind(), "registering named schema");
        self.inner.cache.write().insert(name, Arc::clone(&schema));
        Ok(schema)
    }

    /// The schema registered as `name`. Flushes pending patches first.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.flush();
        self.inner.cache.read().get(name).cloned()
    }

    /// Names of registered schemas, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.cache.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Fill `target` with `evaluate()` at the next flush.
    pub fn patch<T, F>(&self, target: &Deferred<T>, property: impl Into<String>, evaluate: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.enqueue(Patch::new(target, property, evaluate));
    }

    /// Build a schema at the next flush and register it under its name.
    pub fn defer<F>(&self, evaluate: F)
    where
        F: FnOnce() -> Schema + Send + 'static,
    {
        let registry = self.clone();
        self.enqueue(Patch::from_fn("register", move || {
            if let Err(e) = registry.register(evaluate()) {
                tracing::warn!(error = %e, "deferred schema was not registered");
            }
        }));
    }

    fn enqueue(&self, patch: Patch) {
        tracing::debug!(property = %patch.property(), "enqueueing patch");
        if self.inner.patches.push(patch) {
            self.schedule_flush();
        }
    }

    fn schedule_flush(&self) {
        match self.inner.config.flush_policy {
            FlushPolicy::Manual => tracing::trace!("flush scheduled; waiting for tick"),
            FlushPolicy::Spawn => self.spawn_flush(),
        }
    }

    #[cfg(feature = "tokio")]
    fn spawn_flush(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let registry = self.clone();
                // Patches are plain closures and may block.
                handle.spawn_blocking(move || registry.tick());
            }
            Err(_) => tracing::debug!("no tokio runtime; flush waits for tick or get"),
        }
    }

    #[cfg(not(feature = "tokio"))]
    fn spawn_flush(&self) {
        tracing::warn!("spawn flush policy needs the `tokio` feature; flush waits for tick or get");
    }

    /// Run every pending patch now. Returns how many ran.
    pub fn flush(&self) -> usize {
        let resolved = self.inner.patches.flush();
        if resolved > 0 {
            tracing::debug!(resolved, "flushed patch queue");
        }
        resolved
    }

    /// Run the scheduled flush, if any.
    pub fn tick(&self) -> usize {
        if self.inner.patches.is_scheduled() {
            self.flush()
        } else {
            0
        }
    }

    pub fn pending_patches(&self) -> usize {
        self.inner.patches.len()
    }

    pub fn is_flush_scheduled(&self) -> bool {
        self.inner.patches.is_scheduled()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.inner.config)
            .field("types", &self.type_names())
            .field("named", &self.names())
            .field("pending_patches", &self.pending_patches())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Validate;
    use crate::number::number;
    use serde_json::json;

    fn manual() -> Registry {
        Registry::with_config(RegistryConfig {
            register_builtins: true,
            flush_policy: FlushPolicy::Manual,
        })
    }

    #[test]
    fn builtins_are_registered_in_order() {
        assert_eq!(
            manual().type_names(),
            [
                "string", "number", "short", "integer", "long", "float", "double", "boolean",
                "object", "ref"
            ]
        );
        assert!(Registry::with_config(RegistryConfig::manual()).type_names().is_empty());
    }

    #[test]
    fn create_applies_constraints_in_order() {
        let schema = manual()
            .create("string", Some(&json!({"min": 3, "email": true})))
            .unwrap();
        assert_eq!(schema.to_descriptor(), json!({"string": {"min": 3, "email": true}}));
        assert!(!schema.is_valid(&json!("ab")));
    }

    #[test]
    fn create_reports_unknown_kind_and_constraint() {
        let registry = manual();
        assert_eq!(
            registry.create("date", None).unwrap_err(),
            SchemaError::UnknownType { kind: "date".into() }
        );
        assert!(matches!(
            registry.create("boolean", Some(&json!({"min": 1}))),
            Err(SchemaError::UnknownConstraint { .. })
        ));
        assert!(matches!(
            registry.create("number", Some(&json!({"min": "low"}))),
            Err(SchemaError::InvalidArgument { .. })
        ));
        assert!(matches!(
            registry.create("number", Some(&json!([1]))),
            Err(SchemaError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn subkind_factories_keep_their_kind() {
        let schema = manual().create("long", Some(&json!({"max": 9}))).unwrap();
        assert_eq!(schema.kind(), "long");
        assert_eq!(schema.to_descriptor(), json!({"number": {"max": 9}}));
    }

    #[test]
    fn register_factory_overwrites() {
        let registry = manual();
        registry.register_factory("string", || number().into());
        assert_eq!(registry.create("string", None).unwrap().kind(), "number");
        assert_eq!(registry.type_names().iter().filter(|k| *k == "string").count(), 1);
    }

    #[test]
    fn constraints_use_the_registered_name() {
        let registry = manual();
        registry.register_factory("code", || string().min(2).into());
        let catalog = registry.constraints("code").unwrap();
        assert!(catalog.iter().all(|c| c.type_name == "code"));
        assert_eq!(catalog.len(), 11);
        assert!(registry.constraints("date").is_err());
    }

    #[test]
    fn register_requires_a_name() {
        let registry = manual();
        assert_eq!(registry.register(string()).unwrap_err(), SchemaError::Unnamed);
        let stored = registry.register(string().named("Email").email()).unwrap();
        let fetched = registry.get("Email").unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(registry.names(), ["Email"]);
    }

    #[test]
    fn get_flushes_deferred_registrations() {
        let registry = manual();
        registry.defer(|| string().named("Later").into());
        assert_eq!(registry.pending_patches(), 1);
        assert!(registry.is_flush_scheduled());
        assert!(registry.get("Later").is_some());
        assert!(!registry.is_flush_scheduled());
        assert_eq!(registry.tick(), 0);
    }

    #[test]
    fn tick_runs_scheduled_patches() {
        let registry = manual();
        let slot = Deferred::new();
        registry.patch(&slot, "limit", || 10_u32);
        assert_eq!(slot.get(), None);
        assert_eq!(registry.tick(), 1);
        assert_eq!(slot.get(), Some(10));
    }

    #[test]
    fn descriptor_round_trip_for_nested_objects() {
        let registry = manual();
        let descriptor = json!({"object": {"properties": {
            "id": {"integer": {"min": 1}},
            "tags": {"string": {"in": ["a", "b"], "optional": true}}
        }}});
        let schema = registry.from_descriptor(&descriptor).unwrap();
        assert!(schema.is_valid(&json!({"id": 3})));
        assert!(!schema.is_valid(&json!({"id": 0, "tags": "c"})));
        // The optional flag is not part of descriptors.
        assert_eq!(
            schema.to_descriptor(),
            json!({"object": {"properties": {
                "id": {"number": {"min": 1}},
                "tags": {"string": {"in": ["a", "b"]}}
            }}})
        );
    }

    #[test]
    fn reference_target_binds_after_registration() {
        let registry = manual();
        let list = registry
            .from_descriptor(&json!({"object": {"properties": {
                "value": {"number": {}},
                "next": {"ref": {"target": "List", "optional": true}}
            }}}))
            .unwrap()
            .named("List");
        registry.register(list).unwrap();
        let list = registry.get("List").unwrap();
        assert!(list.is_valid(&json!({"value": 1, "next": {"value": 2}})));
        let err = list.validate(&json!({"value": 1, "next": {"value": "2"}})).unwrap_err();
        assert_eq!(err.violations()[0].path, "next.value");
    }

    #[test]
    fn reference_to_unknown_name_stays_unresolved() {
        let registry = manual();
        let r = registry.reference("Missing");
        registry.flush();
        assert!(!r.is_resolved());
        let err = r.validate(&json!({})).unwrap_err();
        assert_eq!(err.violations()[0].name, "unresolved");
    }
}
