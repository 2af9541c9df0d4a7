use serde::{Deserialize, Serialize};

/// Axis-aligned box in screenshot pixels. `(x0, y0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The smaller side, which is what a touch target is measured by.
    pub fn min_side(&self) -> f64 {
        self.width().min(self.height())
    }

    pub fn is_finite(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|value| value.is_finite())
    }
}

/// A candidate interactive element: its visible label and where it sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub element: String,
    pub bbox: BoundingBox,
}

impl Region {
    pub fn new(element: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            element: element.into(),
            bbox,
        }
    }
}
