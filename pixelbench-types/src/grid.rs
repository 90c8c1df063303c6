//! Dense 2D grids and their canonical wire encoding.
//!
//! Every raster-valued field in a document — tile pixel data, pixel-layer
//! data, tile-layer cell grids — stores a [`Grid`]. The flat buffer is
//! row-major, `data[y * w + x]`, and this module is the single authority for
//! that packing: no call site computes flat offsets locally.
//!
//! The wire shape is `{ "w": int, "h": int, "data": [..] }`. Decoding a node
//! whose `data` length disagrees with `w * h` fails with
//! [`GridError::SizeMismatch`].

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Errors produced while decoding or constructing a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The flat buffer length does not match the declared dimensions.
    #[error("grid data length {len} does not match {w}x{h} ({expected} cells)")]
    SizeMismatch {
        w: u32,
        h: u32,
        len: usize,
        expected: usize,
    },
}

/// A dense, row-major 2D grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "GridNode<T>")]
pub struct Grid<T> {
    w: u32,
    h: u32,
    data: Vec<T>,
}

/// The raw wire shape of a grid, before the size invariant is checked.
#[derive(Deserialize)]
struct GridNode<T> {
    w: u32,
    h: u32,
    data: Vec<T>,
}

impl<T> TryFrom<GridNode<T>> for Grid<T> {
    type Error = GridError;

    fn try_from(node: GridNode<T>) -> Result<Self, GridError> {
        Grid::from_flat(node.w, node.h, node.data)
    }
}

impl<T: Serialize> Serialize for Grid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut node = serializer.serialize_struct("Grid", 3)?;
        node.serialize_field("w", &self.w)?;
        node.serialize_field("h", &self.h)?;
        node.serialize_field("data", &self.data)?;
        node.end()
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a `w` by `h` grid with every cell set to `fill`.
    #[must_use]
    pub fn filled(w: u32, h: u32, fill: T) -> Self {
        Self {
            w,
            h,
            data: vec![fill; w as usize * h as usize],
        }
    }

    /// Overwrites every cell with `value`.
    pub fn fill(&mut self, value: T) {
        for cell in &mut self.data {
            *cell = value.clone();
        }
    }
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a `w` by `h` grid of default cells.
    #[must_use]
    pub fn new(w: u32, h: u32) -> Self {
        Self::filled(w, h, T::default())
    }
}

impl<T> Grid<T> {
    /// Builds a grid from a flat row-major buffer, checking the size invariant.
    pub fn from_flat(w: u32, h: u32, data: Vec<T>) -> Result<Self, GridError> {
        let expected = w as usize * h as usize;
        if data.len() != expected {
            return Err(GridError::SizeMismatch {
                w,
                h,
                len: data.len(),
                expected,
            });
        }
        Ok(Self { w, h, data })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.w
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.h
    }

    /// The flat row-major buffer.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Flat index of `(x, y)`, or `None` when out of bounds.
    fn idx(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.w && y < self.h {
            Some(y as usize * self.w as usize + x as usize)
        } else {
            None
        }
    }

    /// Cell at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        self.idx(x, y).map(|i| &self.data[i])
    }

    /// Writes `value` at `(x, y)`. Out-of-bounds writes are a no-op returning
    /// `false`; editors clamp brush strokes rather than erroring mid-drag.
    pub fn set(&mut self, x: u32, y: u32, value: T) -> bool {
        match self.idx(x, y) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// Iterates cells in row-major order with their coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, cell)| ((i % self.w as usize) as u32, (i / self.w as usize) as u32, cell))
    }
}
