//! In-place raster helpers for tiles and tile layers.
//!
//! Assignment, not mutation, is the unit of observable change in the model,
//! so these helpers pair each in-place grid write with an explicit fire on
//! the owning field. Brush strokes batch many writes per frame; replacing the
//! whole grid per pixel through `set` would be wasteful.

use pixelbench_model::{Entity, ModelError, ModelResult, PropValue};
use pixelbench_types::EntityId;

/// Writes one pixel of a tile's raster and fires `data`.
pub fn set_pixel(tile: &Entity, x: u32, y: u32, value: i64) -> ModelResult<()> {
    tile.mutate("data", |stored| match stored {
        PropValue::Pixels(grid) => {
            grid.set(x, y, value);
            Ok(())
        }
        other => Err(ModelError::TypeMismatch {
            expected: "pixel grid".to_string(),
            found: other.kind().label().to_string(),
        }),
    })??;
    tile.fire("data")
}

/// Reads one pixel of a tile's raster. `None` when out of bounds.
pub fn get_pixel(tile: &Entity, x: u32, y: u32) -> ModelResult<Option<i64>> {
    match tile.get("data")? {
        PropValue::Pixels(grid) => Ok(grid.get(x, y).copied()),
        other => Err(ModelError::TypeMismatch {
            expected: "pixel grid".to_string(),
            found: other.kind().label().to_string(),
        }),
    }
}

/// Writes one cell of a tile layer's grid and fires `cells`. `None` clears
/// the cell.
pub fn set_cell(layer: &Entity, x: u32, y: u32, tile: Option<EntityId>) -> ModelResult<()> {
    layer.mutate("cells", |stored| match stored {
        PropValue::Cells(grid) => {
            grid.set(x, y, tile);
            Ok(())
        }
        other => Err(ModelError::TypeMismatch {
            expected: "cell grid".to_string(),
            found: other.kind().label().to_string(),
        }),
    })??;
    layer.fire("cells")
}

/// Reads one cell of a tile layer's grid. `None` for empty or out-of-bounds
/// cells.
pub fn get_cell(layer: &Entity, x: u32, y: u32) -> ModelResult<Option<EntityId>> {
    match layer.get("cells")? {
        PropValue::Cells(grid) => Ok(grid.get(x, y).copied().flatten()),
        other => Err(ModelError::TypeMismatch {
            expected: "cell grid".to_string(),
            found: other.kind().label().to_string(),
        }),
    }
}
