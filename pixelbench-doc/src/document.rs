//! The document envelope and the live document wrapper.
//!
//! On disk a document is
//! `{ "name", "kind", "version", "root": EntityNode }`. Storage adapters
//! treat that envelope as opaque JSON; everything under `root` is the
//! serializer's domain.

use serde_json::{Value, json};
use tracing::warn;

use pixelbench_model::{ClassRegistry, Entity, ModelError, ModelResult, PropValue, restore_entity, to_json};
use pixelbench_types::EntityId;

use crate::error::{DocError, DocResult};
use crate::migrate::{CURRENT_VERSION, upgrade_to_current};

/// A loaded document: envelope metadata plus the live root entity graph.
#[derive(Debug)]
pub struct Document {
    name: String,
    kind: String,
    root: Entity,
}

impl Document {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, root: Entity) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn root(&self) -> &Entity {
        &self.root
    }

    /// Encodes the envelope, always stamped with [`CURRENT_VERSION`].
    pub fn save(&self, registry: &ClassRegistry) -> DocResult<Value> {
        let root = to_json(registry, &self.root)?;
        Ok(json!({
            "name": self.name,
            "kind": self.kind,
            "version": CURRENT_VERSION,
            "root": root,
        }))
    }

    /// Finds an entity anywhere in the reachable graph by id.
    ///
    /// A miss is the document model's one soft condition: creative documents
    /// transiently hold stale references after partial edits, so a dangling
    /// id is logged and resolved as absent rather than aborting anything.
    pub fn find_entity(&self, id: EntityId) -> Option<Entity> {
        let found = walk(&self.root, id);
        if found.is_none() {
            warn!(%id, doc = %self.name, "entity reference not found in document");
        }
        found
    }

    /// Resolves a `Ref` field to its target entity. An absent reference is
    /// `None` without logging; a dangling one logs and resolves as `None`.
    pub fn resolve_ref(&self, entity: &Entity, field: &str) -> ModelResult<Option<Entity>> {
        match entity.get(field)? {
            PropValue::Ref(None) => Ok(None),
            PropValue::Ref(Some(id)) => Ok(self.find_entity(id)),
            other => Err(ModelError::TypeMismatch {
                expected: "reference".to_string(),
                found: other.kind().label().to_string(),
            }),
        }
    }

    /// Resolves one cell of a `Cells` field (a tile-layer grid) to the tile
    /// it references. Empty and out-of-bounds cells are `None` without
    /// logging; a dangling tile id logs and resolves as `None`.
    pub fn resolve_cell(
        &self,
        entity: &Entity,
        field: &str,
        x: u32,
        y: u32,
    ) -> ModelResult<Option<Entity>> {
        match entity.get(field)? {
            PropValue::Cells(grid) => Ok(grid
                .get(x, y)
                .copied()
                .flatten()
                .and_then(|id| self.find_entity(id))),
            other => Err(ModelError::TypeMismatch {
                expected: "cell grid".to_string(),
                found: other.kind().label().to_string(),
            }),
        }
    }
}

fn walk(entity: &Entity, id: EntityId) -> Option<Entity> {
    if entity.id() == id {
        return Some(entity.clone());
    }
    for (name, _) in entity.schema().iter() {
        let Ok(value) = entity.get(name) else {
            continue;
        };
        match value {
            PropValue::Entity(child) => {
                if let Some(found) = walk(&child, id) {
                    return Some(found);
                }
            }
            PropValue::List(items) => {
                for item in items {
                    if let PropValue::Entity(child) = item {
                        if let Some(found) = walk(&child, id) {
                            return Some(found);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Loads a document from its raw envelope JSON.
///
/// Dispatch by version: the current version restores directly; older
/// versions pass through the upgrade chain first; newer versions and
/// unrecognized shapes are refused outright.
pub fn load_document(registry: &ClassRegistry, envelope: Value) -> DocResult<Document> {
    let version = envelope
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| DocError::malformed("missing integer 'version'"))?;
    if version > CURRENT_VERSION {
        return Err(DocError::UnsupportedVersion {
            version,
            current: CURRENT_VERSION,
        });
    }
    let envelope = upgrade_to_current(version, envelope)?;

    let name = envelope
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| DocError::malformed("missing string 'name'"))?
        .to_string();
    let kind = envelope
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| DocError::malformed("missing string 'kind'"))?
        .to_string();
    let root_node = envelope
        .get("root")
        .ok_or_else(|| DocError::malformed("missing 'root' entity node"))?;

    let root = restore_entity(registry, root_node)?;
    Ok(Document::new(name, kind, root))
}
