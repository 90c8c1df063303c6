//! The chain of format upgrades between historical document versions.
//!
//! Each step is a pure function on the raw envelope JSON, applied in order
//! before the root entity graph is restored. Steps only reshape the tree —
//! they never invent user data beyond required-but-absent empty collections.
//!
//! Historical formats:
//! - **v1** — flat legacy shape: `sheets` sat directly in the envelope next
//!   to `name`; there was no root entity node and no `kind`.
//! - **v2** — nested root node, but with the legacy field spellings
//!   `spriteSheets` (on the document) and `tilesize` (on sheets).
//! - **v3** — current spellings, but `maps`, `actors`, and `tests` were
//!   optional and often absent.
//! - **v4** — current: all document collections are always present.

use serde_json::{Map, Value, json};

use pixelbench_types::EntityId;

use crate::error::{DocError, DocResult};

/// The version this build reads natively and always writes.
pub const CURRENT_VERSION: u64 = 4;

/// Lifts the flat v1 shape into a nested root document node.
///
/// The legacy format predates root entity nodes, so the new root gets a
/// fresh id; sheet nodes are carried over untouched.
pub fn upgrade_1_to_2(envelope: Value) -> DocResult<Value> {
    let mut envelope = require_object(envelope)?;
    let name = envelope
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("untitled")
        .to_string();
    let sheets = match envelope.remove("sheets") {
        None => Value::Array(Vec::new()),
        Some(Value::Array(sheets)) => Value::Array(sheets),
        Some(other) => {
            return Err(DocError::malformed(format!(
                "v1 'sheets' must be an array, found {}",
                kind_of(&other)
            )));
        }
    };
    envelope.insert("version".into(), json!(2));
    envelope.entry("kind").or_insert_with(|| json!("game"));
    envelope.insert(
        "root".into(),
        json!({
            "type": "GameDoc",
            "id": EntityId::new().to_string(),
            "fields": { "name": name, "spriteSheets": sheets },
        }),
    );
    Ok(Value::Object(envelope))
}

/// Renames the legacy v2 field spellings to their current forms:
/// `spriteSheets` → `sheets` on the document, `tilesize` → `tile_size`
/// on every sheet node.
pub fn upgrade_2_to_3(envelope: Value) -> DocResult<Value> {
    let mut envelope = require_object(envelope)?;
    if let Some(fields) = root_fields(&mut envelope) {
        if let Some(sheets) = fields.remove("spriteSheets") {
            fields.insert("sheets".into(), sheets);
        }
        if let Some(Value::Array(sheets)) = fields.get_mut("sheets") {
            for sheet in sheets {
                let Some(sheet_fields) = sheet
                    .get_mut("fields")
                    .and_then(Value::as_object_mut)
                else {
                    continue;
                };
                if let Some(size) = sheet_fields.remove("tilesize") {
                    sheet_fields.insert("tile_size".into(), size);
                }
            }
        }
    }
    envelope.insert("version".into(), json!(3));
    Ok(Value::Object(envelope))
}

/// Defaults the document collections that became required in v4: a missing
/// `maps`, `actors`, or `tests` field becomes an empty array.
pub fn upgrade_3_to_4(envelope: Value) -> DocResult<Value> {
    let mut envelope = require_object(envelope)?;
    if let Some(fields) = root_fields(&mut envelope) {
        for required in ["maps", "actors", "tests"] {
            fields
                .entry(required)
                .or_insert_with(|| Value::Array(Vec::new()));
        }
    }
    envelope.insert("version".into(), json!(4));
    Ok(Value::Object(envelope))
}

/// Runs the upgrade chain from `version` up to [`CURRENT_VERSION`].
pub fn upgrade_to_current(version: u64, mut envelope: Value) -> DocResult<Value> {
    let mut at = version;
    while at < CURRENT_VERSION {
        envelope = match at {
            1 => upgrade_1_to_2(envelope)?,
            2 => upgrade_2_to_3(envelope)?,
            3 => upgrade_3_to_4(envelope)?,
            _ => {
                return Err(DocError::UnsupportedVersion {
                    version,
                    current: CURRENT_VERSION,
                });
            }
        };
        at += 1;
    }
    Ok(envelope)
}

fn require_object(envelope: Value) -> DocResult<Map<String, Value>> {
    match envelope {
        Value::Object(map) => Ok(map),
        other => Err(DocError::malformed(format!(
            "envelope must be an object, found {}",
            kind_of(&other)
        ))),
    }
}

fn root_fields(envelope: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    envelope
        .get_mut("root")?
        .get_mut("fields")
        .and_then(Value::as_object_mut)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
