use serde::{Deserialize, Serialize};
use std::fmt;

/// A width/height pair. Used for tile dimensions, map dimensions in cells,
/// and play-test viewports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    #[must_use]
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Total cell count (`w * h`).
    #[must_use]
    pub const fn area(&self) -> usize {
        self.w as usize * self.h as usize
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}
