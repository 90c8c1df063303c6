//! Core type definitions for Pixelbench.
//!
//! Defines the primitive types every other crate builds on:
//! - [`EntityId`] — stable identity for every editable entity
//! - [`Size`] — width/height pair used for tiles, maps, and viewports
//! - [`Grid`] — dense row-major 2D storage with the canonical wire encoding
//!
//! These types carry no behavior beyond storage and encoding; property
//! semantics live in `pixelbench-model`.

mod geom;
mod grid;
mod ids;

pub use geom::Size;
pub use grid::{Grid, GridError};
pub use ids::EntityId;
