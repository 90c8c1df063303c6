//! Copy-on-write mutation helpers for list-valued fields.
//!
//! Assignment, not mutation, is the unit of observable change: both helpers
//! build a new list and hand it to [`Entity::set`], so callers holding the
//! prior snapshot see it unchanged, and `set`'s subscription bookkeeping
//! (un)wires the affected element — nothing here duplicates that logic.

use tracing::warn;

use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::value::PropValue;

/// Appends `value` to the list field `field`, firing exactly one change
/// event on the field.
pub fn append_to_list(entity: &Entity, field: &str, value: PropValue) -> ModelResult<()> {
    let mut items = take_list(entity, field)?;
    items.push(value);
    entity.set(field, PropValue::List(items))
}

/// Removes the first identity-match of `value` from the list field `field`.
///
/// Entities match by id, other values by equality. A missing value is a soft
/// condition: logged and ignored, with no change event.
pub fn remove_from_list(entity: &Entity, field: &str, value: &PropValue) -> ModelResult<()> {
    let mut items = take_list(entity, field)?;
    match items.iter().position(|item| item == value) {
        Some(index) => {
            items.remove(index);
            entity.set(field, PropValue::List(items))
        }
        None => {
            warn!(
                entity_type = entity.type_name(),
                entity_id = %entity.id(),
                field,
                "remove_from_list: value not present, ignoring"
            );
            Ok(())
        }
    }
}

fn take_list(entity: &Entity, field: &str) -> ModelResult<Vec<PropValue>> {
    match entity.get(field)? {
        PropValue::List(items) => Ok(items),
        _ => Err(ModelError::NotAList {
            field: field.to_string(),
        }),
    }
}
