//! Concrete Pixelbench entity types.
//!
//! Every editable thing the authoring tool knows — the game document, sprite
//! sheets, tiles, maps, tile layers, actors, play-tests — is declared here as
//! a schema over `pixelbench-model`'s generic entity machinery, plus a small
//! set of construction and raster helpers. [`register_asset_types`] wires the
//! whole catalog into a registry at startup.

mod helpers;
mod schemas;

pub use helpers::{get_cell, get_pixel, set_cell, set_pixel};
pub use schemas::{
    ACTOR, GAME_DOC, MAP, PLAY_TEST, SHEET, TILE, TILE_LAYER, actor_schema, game_doc_schema,
    map_schema, new_actor, new_game_doc, new_map, new_play_test, new_sheet, new_tile,
    new_tile_layer, play_test_schema, register_asset_types, sheet_schema, tile_layer_schema,
    tile_schema,
};
