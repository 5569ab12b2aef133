use serde::{Deserialize, Serialize};

use crate::viewport::SimulatedViewport;

/// A width and height in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<SimulatedViewport> for Size {
    fn from(viewport: SimulatedViewport) -> Self {
        Self::new(viewport.width(), viewport.height())
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}
