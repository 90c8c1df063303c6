//! The closed set of value kinds a property can hold.
//!
//! The set of concrete entity types is open (registered at startup), but the
//! value domain is closed and enumerable, so a sum type with exhaustive
//! matching replaces the dynamic `Any` storage a looser runtime would use.

use std::collections::HashMap;

use pixelbench_types::{EntityId, Grid, Size};

use crate::entity::Entity;

/// Caller-supplied partial values merged over schema defaults at construction.
pub type PropMap = HashMap<String, PropValue>;

/// Builds a [`PropMap`] from `(name, value)` pairs.
pub fn props<I>(pairs: I) -> PropMap
where
    I: IntoIterator<Item = (&'static str, PropValue)>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Discriminates the value kinds without carrying a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Bool,
    Int,
    Float,
    Str,
    Size,
    /// Raster of palette/tile indices.
    Pixels,
    /// Grid of soft tile references; `None` is an empty cell.
    Cells,
    /// A single owned sub-entity.
    Entity,
    /// A list of owned sub-entities.
    EntityList,
    /// A soft reference to an entity elsewhere in the document.
    Ref,
}

impl PropKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "string",
            Self::Size => "size",
            Self::Pixels => "pixel grid",
            Self::Cells => "cell grid",
            Self::Entity => "entity",
            Self::EntityList => "entity list",
            Self::Ref => "reference",
        }
    }
}

/// A property value.
///
/// Entity-valued variants compare by id: two handles to the same entity are
/// equal, and a restored copy with the same id is equal to the original.
#[derive(Debug, Clone)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Size(Size),
    Pixels(Grid<i64>),
    Cells(Grid<Option<EntityId>>),
    Entity(Entity),
    List(Vec<PropValue>),
    Ref(Option<EntityId>),
}

impl PropValue {
    /// The kind this value belongs to.
    pub fn kind(&self) -> PropKind {
        match self {
            Self::Bool(_) => PropKind::Bool,
            Self::Int(_) => PropKind::Int,
            Self::Float(_) => PropKind::Float,
            Self::Str(_) => PropKind::Str,
            Self::Size(_) => PropKind::Size,
            Self::Pixels(_) => PropKind::Pixels,
            Self::Cells(_) => PropKind::Cells,
            Self::Entity(_) => PropKind::Entity,
            Self::List(_) => PropKind::EntityList,
            Self::Ref(_) => PropKind::Ref,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_size(&self) -> Option<Size> {
        match self {
            Self::Size(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_pixels(&self) -> Option<&Grid<i64>> {
        match self {
            Self::Pixels(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_cells(&self) -> Option<&Grid<Option<EntityId>>> {
        match self {
            Self::Cells(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<EntityId> {
        match self {
            Self::Ref(id) => *id,
            _ => None,
        }
    }

    /// All entity handles directly held by this value (itself for an entity,
    /// each entity element for a list, none otherwise). This is the set a
    /// `watch_children` field subscribes to.
    pub(crate) fn child_entities(&self) -> Vec<Entity> {
        match self {
            Self::Entity(e) => vec![e.clone()],
            Self::List(items) => items
                .iter()
                .filter_map(|item| item.as_entity().cloned())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Size(a), Self::Size(b)) => a == b,
            (Self::Pixels(a), Self::Pixels(b)) => a == b,
            (Self::Cells(a), Self::Cells(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => a.id() == b.id(),
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Size> for PropValue {
    fn from(v: Size) -> Self {
        Self::Size(v)
    }
}

impl From<Entity> for PropValue {
    fn from(v: Entity) -> Self {
        Self::Entity(v)
    }
}
