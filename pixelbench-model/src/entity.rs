//! Schema-driven entities with stable identity and change notification.
//!
//! An [`Entity`] is a cheap-to-clone handle (`Rc` inner). The whole model is
//! single-threaded, synchronous, and cooperative — every mutation and
//! notification completes before the call that triggered it returns — so
//! interior mutability is `RefCell`, not locks.
//!
//! Listener dispatch is re-entrant-safe but not re-entrant-guarded: callbacks
//! may (un)subscribe or call [`Entity::set`] on this or another entity during
//! dispatch. Dispatch iterates a snapshot of the listener set and checks each
//! handle is still registered before invoking it, so nothing is skipped or
//! delivered twice. Mutation cycles are not detected; avoiding infinite
//! notification loops is the caller's responsibility.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use pixelbench_types::EntityId;

use crate::error::{ModelError, ModelResult};
use crate::prop::{PropDef, Schema};
use crate::value::{PropKind, PropMap, PropValue};

/// A change notification delivered to watchers.
#[derive(Clone)]
pub enum ChangeEvent {
    /// A named field changed (or was explicitly fired after an in-place
    /// mutation). Carries a snapshot of the value at dispatch time.
    Field {
        entity: Entity,
        field: String,
        value: PropValue,
    },
    /// A broad "something changed" signal from [`Entity::fire_all`],
    /// delivered to wildcard listeners only.
    Any { entity: Entity },
}

impl ChangeEvent {
    pub fn entity(&self) -> &Entity {
        match self {
            Self::Field { entity, .. } | Self::Any { entity } => entity,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Field { field, .. } => Some(field),
            Self::Any { .. } => None,
        }
    }

    pub fn value(&self) -> Option<&PropValue> {
        match self {
            Self::Field { value, .. } => Some(value),
            Self::Any { .. } => None,
        }
    }
}

impl fmt::Debug for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { entity, field, .. } => f
                .debug_struct("ChangeEvent::Field")
                .field("entity", entity)
                .field("field", field)
                .finish_non_exhaustive(),
            Self::Any { entity } => f
                .debug_struct("ChangeEvent::Any")
                .field("entity", entity)
                .finish(),
        }
    }
}

/// A registered listener callback.
pub type Callback = Rc<dyn Fn(&ChangeEvent)>;

/// Generation-tagged subscription handle. Handles are never reused, so
/// removal is index-stable even while dispatch is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(u64);

struct EntityInner {
    id: EntityId,
    type_name: String,
    schema: Rc<Schema>,
    values: RefCell<PropMap>,
    next_handle: Cell<u64>,
    field_listeners: RefCell<HashMap<String, Vec<(WatchHandle, Callback)>>>,
    wildcard_listeners: RefCell<Vec<(WatchHandle, Callback)>>,
    /// Subscriptions this entity holds on child entities of `watch_children`
    /// fields, keyed by owning field. Replaced wholesale when the field is
    /// reassigned.
    child_subs: RefCell<HashMap<String, Vec<(Entity, WatchHandle)>>>,
}

/// A schema-driven object with stable identity, typed properties, and change
/// notification. Clones share the same underlying entity.
#[derive(Clone)]
pub struct Entity(Rc<EntityInner>);

fn value_fits(kind: PropKind, value: &PropValue) -> bool {
    if value.kind() != kind {
        return false;
    }
    match value {
        PropValue::List(items) => items.iter().all(|item| matches!(item, PropValue::Entity(_))),
        _ => true,
    }
}

impl Entity {
    // ── construction ────────────────────────────────────────────

    /// Creates a fresh entity: caller-supplied partial values are merged over
    /// schema defaults, a new id is assigned, and `watch_children`
    /// subscriptions are established. Construction fires no change events.
    pub fn construct(
        type_name: impl Into<String>,
        schema: Rc<Schema>,
        mut initial: PropMap,
    ) -> ModelResult<Entity> {
        let type_name = type_name.into();
        if let Some(bad) = initial.keys().find(|key| !schema.contains(key.as_str())) {
            return Err(ModelError::UnknownField {
                type_name,
                field: bad.clone(),
            });
        }
        let mut values = PropMap::with_capacity(schema.len());
        for (name, def) in schema.iter() {
            let value = match initial.remove(name) {
                Some(v) => {
                    if !value_fits(def.kind(), &v) {
                        return Err(ModelError::mismatch(def.kind().label(), v.kind().label()));
                    }
                    v
                }
                None => def.default_value(),
            };
            values.insert(name.to_string(), value);
        }
        let entity = Self::from_parts(EntityId::new(), type_name, schema, values);
        entity.wire_all_children();
        Ok(entity)
    }

    /// Builds a bare instance reusing an existing id, for restoration from an
    /// entity node. Assignment fires no change notifications — restoration is
    /// initialization, not mutation. `watch_children` subscriptions are
    /// established after all fields are in place, exactly as [`Entity::set`]
    /// would have.
    pub fn restored(
        type_name: &str,
        schema: Rc<Schema>,
        id: EntityId,
        mut values: PropMap,
    ) -> ModelResult<Entity> {
        if let Some(bad) = values.keys().find(|key| !schema.contains(key.as_str())) {
            return Err(ModelError::UnknownField {
                type_name: type_name.to_string(),
                field: bad.clone(),
            });
        }
        let mut complete = PropMap::with_capacity(schema.len());
        for (name, def) in schema.iter() {
            let value = values.remove(name).unwrap_or_else(|| def.default_value());
            complete.insert(name.to_string(), value);
        }
        let entity = Self::from_parts(id, type_name.to_string(), schema, complete);
        entity.wire_all_children();
        Ok(entity)
    }

    /// Copies all field values into a new entity with a fresh id. Child
    /// entity handles are shared with the source; subscriptions are re-wired
    /// for the clone.
    #[must_use]
    pub fn clone_entity(&self) -> Entity {
        let values = self.0.values.borrow().clone();
        let entity = Self::from_parts(
            EntityId::new(),
            self.0.type_name.clone(),
            Rc::clone(&self.0.schema),
            values,
        );
        entity.wire_all_children();
        entity
    }

    fn from_parts(id: EntityId, type_name: String, schema: Rc<Schema>, values: PropMap) -> Entity {
        Entity(Rc::new(EntityInner {
            id,
            type_name,
            schema,
            values: RefCell::new(values),
            next_handle: Cell::new(0),
            field_listeners: RefCell::new(HashMap::new()),
            wildcard_listeners: RefCell::new(Vec::new()),
            child_subs: RefCell::new(HashMap::new()),
        }))
    }

    // ── identity & reflection ───────────────────────────────────

    pub fn id(&self) -> EntityId {
        self.0.id
    }

    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    pub fn schema(&self) -> &Rc<Schema> {
        &self.0.schema
    }

    /// Field names and definitions in declaration order, for external tooling.
    pub fn schema_entries(&self) -> Vec<(String, PropDef)> {
        self.0
            .schema
            .iter()
            .map(|(name, def)| (name.to_string(), def.clone()))
            .collect()
    }

    // ── property access ─────────────────────────────────────────

    /// Current value of `name`. Every schema field is resolvable at all
    /// times — explicitly set or defaulted — so this never returns "unset".
    /// An undeclared name is a programmer error, never a silent sentinel.
    pub fn get(&self, name: &str) -> ModelResult<PropValue> {
        let def = self
            .0
            .schema
            .get(name)
            .ok_or_else(|| self.unknown_field(name))?;
        if let Some(value) = self.0.values.borrow().get(name) {
            return Ok(value.clone());
        }
        Ok(def.default_value())
    }

    /// Stores a new value for `name`, maintaining `watch_children`
    /// subscriptions, then fires a change event for the field.
    pub fn set(&self, name: &str, value: PropValue) -> ModelResult<()> {
        let def = self
            .0
            .schema
            .get(name)
            .ok_or_else(|| self.unknown_field(name))?;
        if !value_fits(def.kind(), &value) {
            return Err(ModelError::mismatch(def.kind().label(), value.kind().label()));
        }
        let watches = def.watches_children();
        if watches {
            self.unwire_children(name);
        }
        self.0
            .values
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        if watches {
            self.wire_children(name, &value);
        }
        self.dispatch_field(name, value);
        Ok(())
    }

    /// Mutates the stored value of `name` in place, firing nothing.
    ///
    /// For values written cell-by-cell (a raster during a brush stroke) the
    /// replacement in [`Entity::set`] is too expensive per write; callers
    /// batch in-place writes through here and pair them with an explicit
    /// [`Entity::fire`]. The closure must not call back into this entity.
    pub fn mutate<R>(&self, name: &str, f: impl FnOnce(&mut PropValue) -> R) -> ModelResult<R> {
        let def = self
            .0
            .schema
            .get(name)
            .ok_or_else(|| self.unknown_field(name))?;
        let mut values = self.0.values.borrow_mut();
        let slot = values
            .entry(name.to_string())
            .or_insert_with(|| def.default_value());
        Ok(f(slot))
    }

    // ── notification ────────────────────────────────────────────

    /// Notifies listeners of `name` with the currently stored value, without
    /// replacing it. Pairs with [`Entity::mutate`]: assignment, not mutation,
    /// is the unit of observable change, so in-place writes fire manually.
    pub fn fire(&self, name: &str) -> ModelResult<()> {
        let value = self.get(name)?;
        self.dispatch_field(name, value);
        Ok(())
    }

    /// Notifies wildcard listeners only.
    pub fn fire_all(&self) {
        let event = ChangeEvent::Any {
            entity: self.clone(),
        };
        self.dispatch_wildcard(&event);
    }

    /// Registers a listener for changes to `name`.
    pub fn watch(
        &self,
        name: &str,
        callback: impl Fn(&ChangeEvent) + 'static,
    ) -> ModelResult<WatchHandle> {
        if !self.0.schema.contains(name) {
            return Err(self.unknown_field(name));
        }
        let handle = self.next_handle();
        self.0
            .field_listeners
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .push((handle, Rc::new(callback)));
        Ok(handle)
    }

    /// Removes a field listener. Returns `false` if the handle was not
    /// registered (already removed, or registered on another field).
    pub fn unwatch(&self, name: &str, handle: WatchHandle) -> bool {
        let mut listeners = self.0.field_listeners.borrow_mut();
        match listeners.get_mut(name) {
            Some(list) => {
                let before = list.len();
                list.retain(|(h, _)| *h != handle);
                list.len() != before
            }
            None => false,
        }
    }

    /// Registers a wildcard listener, notified of every change on this entity.
    pub fn watch_all(&self, callback: impl Fn(&ChangeEvent) + 'static) -> WatchHandle {
        self.watch_all_rc(Rc::new(callback))
    }

    /// Removes a wildcard listener.
    pub fn unwatch_all(&self, handle: WatchHandle) -> bool {
        let mut listeners = self.0.wildcard_listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(h, _)| *h != handle);
        listeners.len() != before
    }

    fn watch_all_rc(&self, callback: Callback) -> WatchHandle {
        let handle = self.next_handle();
        self.0
            .wildcard_listeners
            .borrow_mut()
            .push((handle, callback));
        handle
    }

    fn next_handle(&self) -> WatchHandle {
        let n = self.0.next_handle.get();
        self.0.next_handle.set(n + 1);
        WatchHandle(n)
    }

    /// Field listeners first, then wildcard listeners. Each pass snapshots
    /// the current list and re-checks registration before every call, so
    /// callbacks may (un)subscribe mid-dispatch.
    fn dispatch_field(&self, field: &str, value: PropValue) {
        let event = ChangeEvent::Field {
            entity: self.clone(),
            field: field.to_string(),
            value,
        };
        let snapshot: Vec<(WatchHandle, Callback)> = self
            .0
            .field_listeners
            .borrow()
            .get(field)
            .cloned()
            .unwrap_or_default();
        for (handle, callback) in snapshot {
            let alive = self
                .0
                .field_listeners
                .borrow()
                .get(field)
                .is_some_and(|list| list.iter().any(|(h, _)| *h == handle));
            if alive {
                callback(&event);
            }
        }
        self.dispatch_wildcard(&event);
    }

    fn dispatch_wildcard(&self, event: &ChangeEvent) {
        let snapshot = self.0.wildcard_listeners.borrow().clone();
        for (handle, callback) in snapshot {
            let alive = self
                .0
                .wildcard_listeners
                .borrow()
                .iter()
                .any(|(h, _)| *h == handle);
            if alive {
                callback(event);
            }
        }
    }

    // ── child subscription bookkeeping ──────────────────────────

    fn wire_all_children(&self) {
        for (name, def) in self.0.schema.iter() {
            if !def.watches_children() {
                continue;
            }
            let value = self.0.values.borrow().get(name).cloned();
            if let Some(value) = value {
                self.wire_children(name, &value);
            }
        }
    }

    /// Subscribes to every entity held by `value`, forwarding any child event
    /// as a change on `field` of this entity. The forwarder holds a weak
    /// back-reference so parent and child do not keep each other alive.
    fn wire_children(&self, field: &str, value: &PropValue) {
        let children = value.child_entities();
        if children.is_empty() {
            return;
        }
        let mut subs = Vec::with_capacity(children.len());
        for child in children {
            let parent = Rc::downgrade(&self.0);
            let field_name = field.to_string();
            let handle = child.watch_all_rc(Rc::new(move |_event: &ChangeEvent| {
                if let Some(inner) = parent.upgrade() {
                    let _ = Entity(inner).fire(&field_name);
                }
            }));
            subs.push((child, handle));
        }
        self.0.child_subs.borrow_mut().insert(field.to_string(), subs);
    }

    fn unwire_children(&self, field: &str) {
        let subs = self.0.child_subs.borrow_mut().remove(field);
        if let Some(subs) = subs {
            for (child, handle) in subs {
                child.unwatch_all(handle);
            }
        }
    }

    fn unknown_field(&self, field: &str) -> ModelError {
        ModelError::UnknownField {
            type_name: self.0.type_name.clone(),
            field: field.to_string(),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.0.type_name)
            .field("id", &self.0.id)
            .finish_non_exhaustive()
    }
}
