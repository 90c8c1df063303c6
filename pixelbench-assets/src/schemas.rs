//! Schemas for every concrete entity type the authoring tool ships.
//!
//! Declared once, registered once at startup via [`register_asset_types`].
//! Field definitions share canonical defs (the "name" field) and override
//! only what differs per type.

use std::rc::Rc;

use pixelbench_model::{
    ClassRegistry, Entity, ModelResult, NumericSettings, PropDef, PropValue, Schema, props,
};
use pixelbench_types::Size;

pub const GAME_DOC: &str = "GameDoc";
pub const SHEET: &str = "Sheet";
pub const TILE: &str = "Tile";
pub const MAP: &str = "Map";
pub const TILE_LAYER: &str = "TileLayer";
pub const ACTOR: &str = "Actor";
pub const PLAY_TEST: &str = "PlayTest";

/// The canonical "name" field every asset type shares, each overriding only
/// the default.
fn name_def(default: &'static str) -> PropDef {
    PropDef::string("unnamed").with_default(move || PropValue::Str(default.to_string()))
}

pub fn game_doc_schema() -> Rc<Schema> {
    Rc::new(
        Schema::new()
            .field("name", name_def("untitled"))
            .field("sheets", PropDef::entity_list().watch_children(true).expandable(true))
            .field("maps", PropDef::entity_list().watch_children(true).expandable(true))
            .field("actors", PropDef::entity_list().watch_children(true).expandable(true))
            .field("tests", PropDef::entity_list().watch_children(true).expandable(true)),
    )
}

pub fn sheet_schema() -> Rc<Schema> {
    Rc::new(
        Schema::new()
            .field("name", name_def("sheet"))
            .field("tile_size", PropDef::size(Size::new(16, 16)).editable(false))
            .field("tiles", PropDef::entity_list().watch_children(true).expandable(true)),
    )
}

pub fn tile_schema() -> Rc<Schema> {
    Rc::new(
        Schema::new()
            .field("name", name_def("tile"))
            .field("size", PropDef::size(Size::new(16, 16)).editable(false))
            // Written pixel-by-pixel during brush strokes; see helpers::set_pixel.
            .field("data", PropDef::pixels(Size::new(16, 16)).hidden(true))
            .field("blocking", PropDef::bool(false)),
    )
}

pub fn map_schema() -> Rc<Schema> {
    Rc::new(
        Schema::new()
            .field("name", name_def("map"))
            .field("size", PropDef::size(Size::new(32, 16)).editable(false))
            .field("layers", PropDef::entity_list().watch_children(true).expandable(true)),
    )
}

pub fn tile_layer_schema() -> Rc<Schema> {
    Rc::new(
        Schema::new()
            .field("name", name_def("layer"))
            .field("size", PropDef::size(Size::new(32, 16)).editable(false))
            .field("cells", PropDef::cells(Size::new(32, 16)).hidden(true))
            .field("visible", PropDef::bool(true))
            .field(
                "scroll_speed",
                PropDef::float(1.0).settings(NumericSettings {
                    min: 0.0,
                    max: 4.0,
                    step: 0.25,
                }),
            )
            // Editor selection state, never persisted.
            .field("selected", PropDef::bool(false).hidden(true).skip_persisting(true)),
    )
}

pub fn actor_schema() -> Rc<Schema> {
    Rc::new(
        Schema::new()
            .field("name", name_def("actor"))
            .field(
                "kind",
                PropDef::string("item").possible_values(vec![
                    PropValue::from("player"),
                    PropValue::from("enemy"),
                    PropValue::from("item"),
                ]),
            )
            .field("sprite", PropDef::reference())
            .field("standing", PropDef::size(Size::new(16, 16))),
    )
}

pub fn play_test_schema() -> Rc<Schema> {
    Rc::new(
        Schema::new()
            .field("name", name_def("test"))
            .field("map", PropDef::reference())
            .field("viewport", PropDef::size(Size::new(20, 12))),
    )
}

/// Registers every concrete asset type. Call once at startup, before the
/// first document load.
pub fn register_asset_types(registry: &mut ClassRegistry) -> ModelResult<()> {
    registry.register(GAME_DOC, game_doc_schema())?;
    registry.register(SHEET, sheet_schema())?;
    registry.register(TILE, tile_schema())?;
    registry.register(MAP, map_schema())?;
    registry.register(TILE_LAYER, tile_layer_schema())?;
    registry.register(ACTOR, actor_schema())?;
    registry.register(PLAY_TEST, play_test_schema())?;
    Ok(())
}

// ── construction shorthands ─────────────────────────────────────

pub fn new_game_doc(registry: &ClassRegistry, name: &str) -> ModelResult<Entity> {
    registry.construct(GAME_DOC, props([("name", PropValue::from(name))]))
}

pub fn new_sheet(registry: &ClassRegistry, name: &str, tile_size: Size) -> ModelResult<Entity> {
    registry.construct(
        SHEET,
        props([
            ("name", PropValue::from(name)),
            ("tile_size", PropValue::Size(tile_size)),
        ]),
    )
}

/// A blank tile whose raster matches `size`.
pub fn new_tile(registry: &ClassRegistry, size: Size) -> ModelResult<Entity> {
    registry.construct(
        TILE,
        props([
            ("size", PropValue::Size(size)),
            (
                "data",
                PropValue::Pixels(pixelbench_types::Grid::new(size.w, size.h)),
            ),
        ]),
    )
}

pub fn new_map(registry: &ClassRegistry, name: &str, size: Size) -> ModelResult<Entity> {
    registry.construct(
        MAP,
        props([
            ("name", PropValue::from(name)),
            ("size", PropValue::Size(size)),
        ]),
    )
}

/// A tile layer whose cell grid matches `size`, all cells empty.
pub fn new_tile_layer(registry: &ClassRegistry, name: &str, size: Size) -> ModelResult<Entity> {
    registry.construct(
        TILE_LAYER,
        props([
            ("name", PropValue::from(name)),
            ("size", PropValue::Size(size)),
            (
                "cells",
                PropValue::Cells(pixelbench_types::Grid::new(size.w, size.h)),
            ),
        ]),
    )
}

pub fn new_actor(registry: &ClassRegistry, name: &str, kind: &str) -> ModelResult<Entity> {
    registry.construct(
        ACTOR,
        props([
            ("name", PropValue::from(name)),
            ("kind", PropValue::from(kind)),
        ]),
    )
}

pub fn new_play_test(registry: &ClassRegistry, name: &str) -> ModelResult<Entity> {
    registry.construct(PLAY_TEST, props([("name", PropValue::from(name))]))
}
