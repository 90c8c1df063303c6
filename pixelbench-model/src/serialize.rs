//! Converting entity graphs to and from their JSON tree encoding.
//!
//! An entity encodes as an EntityNode `{ "type", "id", "fields": {..} }`;
//! entity lists as plain arrays; grids as `{ "w", "h", "data" }` nodes.
//! Decoding is fail-fast and whole-load-aborting: any structural problem
//! surfaces as a [`LoadError`] carrying the path to the offending node.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use pixelbench_types::{EntityId, Grid, Size};

use crate::entity::Entity;
use crate::error::{LoadError, ModelError, ModelResult, PathStep};
use crate::prop::{Codec, PropDef};
use crate::value::PropKind;
use crate::registry::ClassRegistry;
use crate::value::{PropMap, PropValue};

/// Encodes an entity graph as an EntityNode tree.
///
/// Fields flagged `skip_persisting` are omitted. Fails with
/// [`ModelError::UnknownType`] if the entity's concrete type was never
/// registered — persisting it would silently drop data on the next load.
pub fn to_json(registry: &ClassRegistry, entity: &Entity) -> ModelResult<Value> {
    registry.resolve(entity.type_name())?;
    let mut fields = Map::new();
    for (name, def) in entity.schema().iter() {
        if def.skips_persisting() {
            continue;
        }
        let value = entity.get(name)?;
        let encoded = match def.codec() {
            Codec::Custom { encode, .. } => encode(&value)?,
            Codec::Auto => encode_auto(registry, &value)?,
        };
        fields.insert(name.to_string(), encoded);
    }
    Ok(json!({
        "type": entity.type_name(),
        "id": entity.id().to_string(),
        "fields": Value::Object(fields),
    }))
}

fn encode_auto(registry: &ClassRegistry, value: &PropValue) -> ModelResult<Value> {
    Ok(match value {
        PropValue::Bool(b) => json!(b),
        PropValue::Int(n) => json!(n),
        PropValue::Float(n) => json!(n),
        PropValue::Str(s) => json!(s),
        PropValue::Size(s) => json!({ "w": s.w, "h": s.h }),
        PropValue::Pixels(g) => json!({
            "w": g.width(),
            "h": g.height(),
            "data": g.data(),
        }),
        PropValue::Cells(g) => json!({
            "w": g.width(),
            "h": g.height(),
            "data": g
                .data()
                .iter()
                .map(|cell| match cell {
                    Some(id) => json!(id.to_string()),
                    None => Value::Null,
                })
                .collect::<Vec<Value>>(),
        }),
        PropValue::Entity(child) => to_json(registry, child)?,
        PropValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| encode_auto(registry, item))
                .collect::<ModelResult<Vec<Value>>>()?,
        ),
        PropValue::Ref(Some(id)) => json!(id.to_string()),
        PropValue::Ref(None) => Value::Null,
    })
}

/// Reconstructs an entity graph from an EntityNode tree.
///
/// The restored entity reuses the id embedded in the node. Fields present in
/// the node are decoded through the schema's codecs; absent fields take their
/// defaults. No change notifications fire during restoration, and
/// `watch_children` subscriptions are established once all fields are set.
pub fn restore_entity(registry: &ClassRegistry, node: &Value) -> Result<Entity, LoadError> {
    let mut path = Vec::new();
    restore_at(registry, node, &mut path)
}

fn restore_at(
    registry: &ClassRegistry,
    node: &Value,
    path: &mut Vec<PathStep>,
) -> Result<Entity, LoadError> {
    let obj = node
        .as_object()
        .ok_or_else(|| err_at(path, ModelError::mismatch("entity node", json_kind(node))))?;
    let type_name = obj.get("type").and_then(Value::as_str).ok_or_else(|| {
        err_at(
            path,
            ModelError::mismatch("entity node with a string 'type'", json_kind(node)),
        )
    })?;
    let entry = registry
        .resolve(type_name)
        .map_err(|source| err_at(path, source))?;
    let id_str = obj.get("id").and_then(Value::as_str).ok_or_else(|| {
        err_at(
            path,
            ModelError::mismatch("entity node with a string 'id'", json_kind(node)),
        )
    })?;
    let id = EntityId::parse(id_str).map_err(|_| {
        err_at(
            path,
            ModelError::InvalidId {
                value: id_str.to_string(),
            },
        )
    })?;

    let empty = Map::new();
    let fields = match obj.get("fields") {
        None => &empty,
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(err_at(
                path,
                ModelError::mismatch("object 'fields'", json_kind(other)),
            ));
        }
    };

    let mut values = PropMap::with_capacity(entry.schema.len());
    for (name, def) in entry.schema.iter() {
        let value = match fields.get(name) {
            Some(field_node) => {
                path.push(PathStep::Field(name.to_string()));
                let decoded = decode_field(registry, def, field_node, path)?;
                path.pop();
                decoded
            }
            None => def.default_value(),
        };
        values.insert(name.to_string(), value);
    }

    (entry.constructor)(type_name, entry.schema.clone(), id, values)
        .map_err(|source| err_at(path, source))
}

fn decode_field(
    registry: &ClassRegistry,
    def: &PropDef,
    node: &Value,
    path: &mut Vec<PathStep>,
) -> Result<PropValue, LoadError> {
    if let Codec::Custom { decode, .. } = def.codec() {
        return decode(node).map_err(|source| err_at(path, source));
    }
    decode_auto(registry, def.kind(), node, path)
}

fn decode_auto(
    registry: &ClassRegistry,
    kind: PropKind,
    node: &Value,
    path: &mut Vec<PathStep>,
) -> Result<PropValue, LoadError> {
    let mismatch = |expected: &str| err_at(path, ModelError::mismatch(expected, json_kind(node)));
    match kind {
        PropKind::Bool => node.as_bool().map(PropValue::Bool).ok_or_else(|| mismatch("bool")),
        PropKind::Int => node.as_i64().map(PropValue::Int).ok_or_else(|| mismatch("integer")),
        PropKind::Float => node
            .as_f64()
            .map(PropValue::Float)
            .ok_or_else(|| mismatch("number")),
        PropKind::Str => node
            .as_str()
            .map(|s| PropValue::Str(s.to_string()))
            .ok_or_else(|| mismatch("string")),
        PropKind::Size => serde_json::from_value::<Size>(node.clone())
            .map(PropValue::Size)
            .map_err(|_| mismatch("size node")),
        PropKind::Pixels => decode_grid::<i64>(node, path).map(PropValue::Pixels),
        PropKind::Cells => decode_grid::<Option<EntityId>>(node, path).map(PropValue::Cells),
        PropKind::Entity => restore_at(registry, node, path).map(PropValue::Entity),
        PropKind::EntityList => {
            let elements = node.as_array().ok_or_else(|| mismatch("array"))?;
            let mut items = Vec::with_capacity(elements.len());
            for (i, element) in elements.iter().enumerate() {
                path.push(PathStep::Index(i));
                let child = restore_at(registry, element, path)?;
                path.pop();
                items.push(PropValue::Entity(child));
            }
            Ok(PropValue::List(items))
        }
        PropKind::Ref => match node {
            Value::Null => Ok(PropValue::Ref(None)),
            Value::String(s) => EntityId::parse(s).map(|id| PropValue::Ref(Some(id))).map_err(|_| {
                err_at(
                    path,
                    ModelError::InvalidId {
                        value: s.to_string(),
                    },
                )
            }),
            _ => Err(mismatch("entity id or null")),
        },
    }
}

/// The raw wire shape of a grid, kept separate from `Grid`'s own serde impl
/// so a bad flat-buffer length surfaces as a typed [`ModelError::Grid`]
/// rather than an opaque serde message.
#[derive(Deserialize)]
struct RawGrid<T> {
    w: u32,
    h: u32,
    data: Vec<T>,
}

fn decode_grid<T: DeserializeOwned>(
    node: &Value,
    path: &mut Vec<PathStep>,
) -> Result<Grid<T>, LoadError> {
    let raw: RawGrid<T> = serde_json::from_value(node.clone())
        .map_err(|_| err_at(path, ModelError::mismatch("grid node", json_kind(node))))?;
    Grid::from_flat(raw.w, raw.h, raw.data).map_err(|e| err_at(path, ModelError::Grid(e)))
}

fn err_at(path: &[PathStep], source: ModelError) -> LoadError {
    LoadError::new(path.to_vec(), source)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prop::{PropDef, Schema};
    use crate::value::props;
    use pixelbench_types::GridError;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry
            .register(
                "Note",
                Rc::new(
                    Schema::new()
                        .field("text", PropDef::string(""))
                        .field("pinned", PropDef::bool(false))
                        .field("cursor", PropDef::int(0).skip_persisting(true)),
                ),
            )
            .unwrap();
        registry
    }

    #[test]
    fn unregistered_type_cannot_be_saved() {
        let registry = registry();
        let schema = Rc::new(Schema::new().field("text", PropDef::string("")));
        let stray = Entity::construct("Unregistered", schema, PropMap::new()).unwrap();
        assert!(matches!(
            to_json(&registry, &stray),
            Err(ModelError::UnknownType { .. })
        ));
    }

    #[test]
    fn unknown_type_in_node_fails_load() {
        let registry = registry();
        let node = json!({
            "type": "Nonexistent",
            "id": EntityId::new().to_string(),
            "fields": {},
        });
        let err = restore_entity(&registry, &node).unwrap_err();
        assert!(matches!(err.source, ModelError::UnknownType { .. }));
    }

    #[test]
    fn transient_fields_are_excluded_and_redefaulted() {
        let registry = registry();
        let note = registry
            .construct(
                "Note",
                props([
                    ("text", PropValue::from("hello")),
                    ("cursor", PropValue::Int(7)),
                ]),
            )
            .unwrap();
        let node = to_json(&registry, &note).unwrap();
        assert_eq!(node["fields"].get("cursor"), None);

        let restored = restore_entity(&registry, &node).unwrap();
        assert_eq!(restored.get("cursor").unwrap(), PropValue::Int(0));
        assert_eq!(restored.get("text").unwrap(), PropValue::from("hello"));
    }

    #[test]
    fn restored_entity_keeps_its_id() {
        let registry = registry();
        let note = registry.construct("Note", PropMap::new()).unwrap();
        let node = to_json(&registry, &note).unwrap();
        let restored = restore_entity(&registry, &node).unwrap();
        assert_eq!(restored.id(), note.id());
    }

    #[test]
    fn missing_node_fields_take_defaults() {
        let registry = registry();
        let node = json!({
            "type": "Note",
            "id": EntityId::new().to_string(),
            "fields": { "text": "partial" },
        });
        let restored = restore_entity(&registry, &node).unwrap();
        assert_eq!(restored.get("pinned").unwrap(), PropValue::Bool(false));
    }

    #[test]
    fn grid_size_mismatch_reports_path() {
        let mut registry = ClassRegistry::new();
        registry
            .register(
                "Tile",
                Rc::new(Schema::new().field("data", PropDef::pixels(Size::new(2, 2)))),
            )
            .unwrap();
        let node = json!({
            "type": "Tile",
            "id": EntityId::new().to_string(),
            "fields": { "data": { "w": 2, "h": 2, "data": [1, 2, 3] } },
        });
        let err = restore_entity(&registry, &node).unwrap_err();
        assert_eq!(err.path.to_string(), "root.data");
        assert!(matches!(
            err.source,
            ModelError::Grid(GridError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn malformed_node_shape_is_fatal() {
        let registry = registry();
        let err = restore_entity(&registry, &json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err.source, ModelError::TypeMismatch { .. }));
    }

    #[test]
    fn custom_codec_round_trips() {
        // Color stored as a hex string on disk, an int in memory.
        let mut registry = ClassRegistry::new();
        registry
            .register(
                "Swatch",
                Rc::new(Schema::new().field(
                    "color",
                    PropDef::int(0).with_codec(
                        |v| match v {
                            PropValue::Int(n) => Ok(json!(format!("#{n:06x}"))),
                            other => Err(ModelError::mismatch("int", other.kind().label())),
                        },
                        |node| {
                            let s = node
                                .as_str()
                                .and_then(|s| s.strip_prefix('#'))
                                .ok_or_else(|| ModelError::mismatch("hex string", "other"))?;
                            i64::from_str_radix(s, 16)
                                .map(PropValue::Int)
                                .map_err(|_| ModelError::mismatch("hex string", "other"))
                        },
                    ),
                )),
            )
            .unwrap();
        let swatch = registry
            .construct("Swatch", props([("color", PropValue::Int(0xff8800))]))
            .unwrap();
        let node = to_json(&registry, &swatch).unwrap();
        assert_eq!(node["fields"]["color"], json!("#ff8800"));
        let restored = restore_entity(&registry, &node).unwrap();
        assert_eq!(restored.get("color").unwrap(), PropValue::Int(0xff8800));
    }
}
