//! The class registry: a string-keyed catalog enabling polymorphic
//! reconstruction of concrete entity types.
//!
//! This is explicit, injectable state — the embedding application owns one
//! registry, populates it at startup, and passes it to (de)serialization.
//! Every persistable concrete type must be registered before the first load;
//! that is an initialization-ordering requirement, not a runtime one.

use std::collections::HashMap;
use std::rc::Rc;

use pixelbench_types::EntityId;

use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::prop::Schema;
use crate::value::PropMap;

/// Builds a bare instance of a concrete type from restored parts. The id is
/// the one embedded in the entity node, never a fresh one.
pub type Constructor =
    fn(type_name: &str, schema: Rc<Schema>, id: EntityId, values: PropMap) -> ModelResult<Entity>;

/// One registered concrete type.
#[derive(Clone)]
pub struct RegistryEntry {
    pub constructor: Constructor,
    pub schema: Rc<Schema>,
}

/// Catalog mapping type names to `(constructor, schema)`.
#[derive(Default)]
pub struct ClassRegistry {
    types: HashMap<String, RegistryEntry>,
}

impl ClassRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a concrete type with the standard constructor
    /// ([`Entity::restored`]).
    pub fn register(&mut self, type_name: impl Into<String>, schema: Rc<Schema>) -> ModelResult<()> {
        self.register_with(type_name, Entity::restored, schema)
    }

    /// Registers a concrete type with an explicit constructor.
    ///
    /// Registering the same name twice with the identical constructor and
    /// schema is idempotent; a different constructor or schema under an
    /// already-bound name is fatal — it would make reconstruction ambiguous.
    pub fn register_with(
        &mut self,
        type_name: impl Into<String>,
        constructor: Constructor,
        schema: Rc<Schema>,
    ) -> ModelResult<()> {
        let type_name = type_name.into();
        if let Some(existing) = self.types.get(&type_name) {
            let same = std::ptr::fn_addr_eq(existing.constructor, constructor)
                && Rc::ptr_eq(&existing.schema, &schema);
            if same {
                return Ok(());
            }
            return Err(ModelError::DuplicateRegistration { type_name });
        }
        self.types.insert(
            type_name,
            RegistryEntry {
                constructor,
                schema,
            },
        );
        Ok(())
    }

    /// Looks up a type, failing with [`ModelError::UnknownType`] if absent.
    pub fn resolve(&self, type_name: &str) -> ModelResult<RegistryEntry> {
        self.types
            .get(type_name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownType {
                type_name: type_name.to_string(),
            })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Constructs a fresh entity of a registered type, merging `initial` over
    /// the type's schema defaults.
    pub fn construct(&self, type_name: &str, initial: PropMap) -> ModelResult<Entity> {
        let entry = self.resolve(type_name)?;
        Entity::construct(type_name, entry.schema, initial)
    }

    /// Registered type names, unordered.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prop::PropDef;

    fn tile_schema() -> Rc<Schema> {
        Rc::new(Schema::new().field("name", PropDef::string("tile")))
    }

    fn other_ctor(
        _type_name: &str,
        _schema: Rc<Schema>,
        _id: EntityId,
        _values: PropMap,
    ) -> ModelResult<Entity> {
        unreachable!("never invoked in this test")
    }

    #[test]
    fn resolve_unknown_type_fails() {
        let registry = ClassRegistry::new();
        assert!(matches!(
            registry.resolve("Nonexistent"),
            Err(ModelError::UnknownType { .. })
        ));
    }

    #[test]
    fn identical_reregistration_is_idempotent() {
        let mut registry = ClassRegistry::new();
        let schema = tile_schema();
        registry.register("Tile", Rc::clone(&schema)).unwrap();
        registry.register("Tile", schema).unwrap();
        assert!(registry.contains("Tile"));
    }

    #[test]
    fn conflicting_registration_fails() {
        let mut registry = ClassRegistry::new();
        registry.register("Tile", tile_schema()).unwrap();
        let err = registry
            .register_with("Tile", other_ctor, tile_schema())
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateRegistration { .. }));
    }

    #[test]
    fn construct_uses_registered_schema() {
        let mut registry = ClassRegistry::new();
        registry.register("Tile", tile_schema()).unwrap();
        let tile = registry.construct("Tile", PropMap::new()).unwrap();
        assert_eq!(tile.type_name(), "Tile");
        assert_eq!(
            tile.get("name").unwrap(),
            crate::value::PropValue::Str("tile".into())
        );
    }
}
