//! Fitting a frame's nominal device size into the space its container has.

use serde::{Deserialize, Serialize};

use crate::size::Size;
use crate::viewport::SimulatedViewport;

/// `min(container.width / frame.width, container.height / frame.height)`,
/// never above `1.0`. A collapsed container gives `0.0`.
pub fn scale_to_fit(container: Size, frame: &SimulatedViewport) -> f64 {
    let scale_x = f64::from(container.width) / f64::from(frame.width());
    let scale_y = f64::from(container.height) / f64::from(frame.height());
    scale_x.min(scale_y).clamp(0.0, 1.0)
}

/// Keeps the scale factor of one frame current.
///
/// The factor is recomputed when the frame's nominal size changes and when the
/// container is resized by the surrounding layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleToFit {
    nominal: SimulatedViewport,
    container: Size,
    scale: f64,
}

impl ScaleToFit {
    pub fn new(nominal: SimulatedViewport, container: Size) -> Self {
        Self {
            nominal,
            container,
            scale: scale_to_fit(container, &nominal),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn nominal(&self) -> &SimulatedViewport {
        &self.nominal
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Size the scaled frame occupies on screen.
    pub fn displayed(&self) -> (f64, f64) {
        (
            f64::from(self.nominal.width()) * self.scale,
            f64::from(self.nominal.height()) * self.scale,
        )
    }

    /// Returns the new factor if it changed.
    pub fn set_nominal(&mut self, nominal: SimulatedViewport) -> Option<f64> {
        self.nominal = nominal;
        self.recompute()
    }

    /// Returns the new factor if it changed.
    pub fn resize_container(&mut self, container: Size) -> Option<f64> {
        self.container = container;
        self.recompute()
    }

    fn recompute(&mut self) -> Option<f64> {
        let scale = scale_to_fit(self.container, &self.nominal);
        if scale == self.scale {
            return None;
        }
        self.scale = scale;
        Some(scale)
    }

    /// e.g. `41.7%`
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.scale * 100.0)
    }
}
