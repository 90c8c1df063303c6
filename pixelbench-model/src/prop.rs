//! Property definitions and schemas.
//!
//! A [`PropDef`] describes one field: its kind, default factory, editor
//! metadata, and JSON codec. Definitions are immutable once built; variants
//! are produced by cloning and overriding, so many entity types can share one
//! canonical definition (a "name" field, say) while independently replacing
//! its default.
//!
//! A [`Schema`] is the ordered field list declared once per concrete entity
//! type, never per instance, and shared as `Rc<Schema>`.

use std::fmt;
use std::rc::Rc;

use pixelbench_types::Size;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelResult;
use crate::value::{PropKind, PropValue};

/// Factory for a field's default. Must return a freshly allocated value on
/// every call: a definition whose default is a mutable container is a factory,
/// never a cached singleton.
pub type DefaultFn = Rc<dyn Fn() -> PropValue>;

/// Presentation-only formatter. Never participates in persistence or equality.
pub type FormatFn = Rc<dyn Fn(&PropValue) -> String>;

/// Custom per-field encoder.
pub type EncodeFn = Rc<dyn Fn(&PropValue) -> ModelResult<Value>>;

/// Custom per-field decoder. Must be the exact inverse of the paired encoder
/// for every value the field can legally hold.
pub type DecodeFn = Rc<dyn Fn(&Value) -> ModelResult<PropValue>>;

/// How a field's value crosses the JSON boundary.
#[derive(Clone)]
pub enum Codec {
    /// Structural encoding driven by the field's kind: primitives directly,
    /// grids through the grid codec, entity and entity-list values through
    /// the serializer (composite decode recurses, never hand-decodes).
    Auto,
    /// A per-field closure pair overriding the structural encoding.
    Custom { encode: EncodeFn, decode: DecodeFn },
}

/// Advisory numeric range metadata for editors. Not enforced by the core;
/// exposed unchanged through reflection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSettings {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Per-field contract: kind, default, codec, and editor metadata.
#[derive(Clone)]
pub struct PropDef {
    kind: PropKind,
    editable: bool,
    hidden: bool,
    expandable: bool,
    watch_children: bool,
    skip_persisting: bool,
    custom: Option<String>,
    settings: Option<NumericSettings>,
    possible_values: Option<Vec<PropValue>>,
    default: DefaultFn,
    format: Option<FormatFn>,
    codec: Codec,
}

impl PropDef {
    fn base(kind: PropKind, default: DefaultFn) -> Self {
        Self {
            kind,
            editable: true,
            hidden: false,
            expandable: false,
            watch_children: false,
            skip_persisting: false,
            custom: None,
            settings: None,
            possible_values: None,
            default,
            format: None,
            codec: Codec::Auto,
        }
    }

    // ── per-kind constructors ───────────────────────────────────

    pub fn string(default: impl Into<String>) -> Self {
        let default = default.into();
        Self::base(
            PropKind::Str,
            Rc::new(move || PropValue::Str(default.clone())),
        )
    }

    pub fn int(default: i64) -> Self {
        Self::base(PropKind::Int, Rc::new(move || PropValue::Int(default)))
    }

    pub fn float(default: f64) -> Self {
        Self::base(PropKind::Float, Rc::new(move || PropValue::Float(default)))
    }

    pub fn bool(default: bool) -> Self {
        Self::base(PropKind::Bool, Rc::new(move || PropValue::Bool(default)))
    }

    pub fn size(default: Size) -> Self {
        Self::base(PropKind::Size, Rc::new(move || PropValue::Size(default)))
    }

    /// A raster field defaulting to an all-zero grid of the given dimensions.
    pub fn pixels(default_size: Size) -> Self {
        Self::base(
            PropKind::Pixels,
            Rc::new(move || {
                PropValue::Pixels(pixelbench_types::Grid::new(default_size.w, default_size.h))
            }),
        )
    }

    /// A tile-reference grid defaulting to all-empty cells.
    pub fn cells(default_size: Size) -> Self {
        Self::base(
            PropKind::Cells,
            Rc::new(move || {
                PropValue::Cells(pixelbench_types::Grid::new(default_size.w, default_size.h))
            }),
        )
    }

    /// A single sub-entity field. The factory runs once per construction.
    pub fn entity(factory: impl Fn() -> PropValue + 'static) -> Self {
        Self::base(PropKind::Entity, Rc::new(factory))
    }

    /// A sub-entity list field, defaulting to an empty list.
    pub fn entity_list() -> Self {
        Self::base(PropKind::EntityList, Rc::new(|| PropValue::List(Vec::new())))
    }

    /// A soft reference field, defaulting to absent.
    pub fn reference() -> Self {
        Self::base(PropKind::Ref, Rc::new(|| PropValue::Ref(None)))
    }

    // ── copy-with-override builders ─────────────────────────────

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn expandable(mut self, expandable: bool) -> Self {
        self.expandable = expandable;
        self
    }

    /// Forward child-entity change events as a change on this field.
    pub fn watch_children(mut self, watch: bool) -> Self {
        self.watch_children = watch;
        self
    }

    /// Exclude this field from serialization (transient/editor-only state).
    pub fn skip_persisting(mut self, skip: bool) -> Self {
        self.skip_persisting = skip;
        self
    }

    /// Free-form editor hint ("color", "multiline", ...).
    pub fn custom(mut self, tag: impl Into<String>) -> Self {
        self.custom = Some(tag.into());
        self
    }

    pub fn settings(mut self, settings: NumericSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Enumerated domain for editors. Advisory, not enforced.
    pub fn possible_values(mut self, values: Vec<PropValue>) -> Self {
        self.possible_values = Some(values);
        self
    }

    /// Replaces the default factory, keeping everything else. This is the
    /// copy-with-overrides operation that lets types share canonical defs.
    pub fn with_default(mut self, factory: impl Fn() -> PropValue + 'static) -> Self {
        self.default = Rc::new(factory);
        self
    }

    pub fn with_format(mut self, format: impl Fn(&PropValue) -> String + 'static) -> Self {
        self.format = Some(Rc::new(format));
        self
    }

    /// Replaces the structural codec with a custom closure pair.
    pub fn with_codec(
        mut self,
        encode: impl Fn(&PropValue) -> ModelResult<Value> + 'static,
        decode: impl Fn(&Value) -> ModelResult<PropValue> + 'static,
    ) -> Self {
        self.codec = Codec::Custom {
            encode: Rc::new(encode),
            decode: Rc::new(decode),
        };
        self
    }

    // ── accessors ───────────────────────────────────────────────

    pub fn kind(&self) -> PropKind {
        self.kind
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    pub fn watches_children(&self) -> bool {
        self.watch_children
    }

    pub fn skips_persisting(&self) -> bool {
        self.skip_persisting
    }

    pub fn custom_tag(&self) -> Option<&str> {
        self.custom.as_deref()
    }

    pub fn numeric_settings(&self) -> Option<NumericSettings> {
        self.settings
    }

    pub fn possible_value_list(&self) -> Option<&[PropValue]> {
        self.possible_values.as_deref()
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Runs the default factory, yielding a fresh value.
    pub fn default_value(&self) -> PropValue {
        (self.default)()
    }

    /// Formats a value for display. Presentation only.
    pub fn format(&self, value: &PropValue) -> String {
        if let Some(format) = &self.format {
            return format(value);
        }
        match value {
            PropValue::Bool(b) => b.to_string(),
            PropValue::Int(n) => n.to_string(),
            PropValue::Float(n) => n.to_string(),
            PropValue::Str(s) => s.clone(),
            PropValue::Size(s) => s.to_string(),
            PropValue::Pixels(g) => format!("{}x{} pixels", g.width(), g.height()),
            PropValue::Cells(g) => format!("{}x{} cells", g.width(), g.height()),
            PropValue::Entity(e) => format!("{} {}", e.type_name(), e.id()),
            PropValue::List(items) => format!("{} items", items.len()),
            PropValue::Ref(Some(id)) => id.to_string(),
            PropValue::Ref(None) => "(none)".to_string(),
        }
    }
}

impl fmt::Debug for PropDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropDef")
            .field("kind", &self.kind)
            .field("editable", &self.editable)
            .field("hidden", &self.hidden)
            .field("expandable", &self.expandable)
            .field("watch_children", &self.watch_children)
            .field("skip_persisting", &self.skip_persisting)
            .field("custom", &self.custom)
            .finish_non_exhaustive()
    }
}

/// Ordered field-name → definition mapping for one concrete entity type.
#[derive(Debug, Default)]
pub struct Schema {
    fields: Vec<(String, PropDef)>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field. Panics on a duplicate name — schemas are declared
    /// once at startup and a duplicate is a programming mistake, not input.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, def: PropDef) -> Self {
        let name = name.into();
        assert!(
            !self.fields.iter().any(|(existing, _)| *existing == name),
            "duplicate schema field '{name}'"
        );
        self.fields.push((name, def));
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropDef> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, def)| def)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropDef)> {
        self.fields.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fresh_on_every_call() {
        let def = PropDef::pixels(Size::new(2, 2));
        let PropValue::Pixels(mut a) = def.default_value() else {
            panic!("expected pixels");
        };
        a.set(0, 0, 9);
        let PropValue::Pixels(b) = def.default_value() else {
            panic!("expected pixels");
        };
        assert_eq!(b.get(0, 0), Some(&0));
    }

    #[test]
    fn with_default_overrides_only_the_default() {
        let canonical = PropDef::string("unnamed").custom("multiline");
        let variant = canonical
            .clone()
            .with_default(|| PropValue::Str("tile".into()));
        assert_eq!(canonical.default_value(), PropValue::Str("unnamed".into()));
        assert_eq!(variant.default_value(), PropValue::Str("tile".into()));
        assert_eq!(variant.custom_tag(), Some("multiline"));
    }

    #[test]
    fn schema_preserves_declaration_order() {
        let schema = Schema::new()
            .field("name", PropDef::string(""))
            .field("size", PropDef::size(Size::new(4, 4)))
            .field("blocking", PropDef::bool(false));
        let names: Vec<&str> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["name", "size", "blocking"]);
    }

    #[test]
    #[should_panic(expected = "duplicate schema field")]
    fn duplicate_field_panics() {
        let _ = Schema::new()
            .field("name", PropDef::string(""))
            .field("name", PropDef::string(""));
    }

    #[test]
    fn format_is_presentation_only() {
        let def = PropDef::float(1.0).with_format(|v| format!("{:.2}s", v.as_float().unwrap()));
        assert_eq!(def.format(&PropValue::Float(0.5)), "0.50s");
    }
}
