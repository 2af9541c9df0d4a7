use uilens_contracts::regions::Region;

use crate::image_input::ImageInput;

/// Source of interactive-element regions for a screenshot.
pub trait RegionDetector: Send + Sync {
    fn detect(&self, image: &ImageInput) -> Vec<Region>;
}

/// Detects nothing. Heuristics still run and report on an empty screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegions;

impl RegionDetector for NoRegions {
    fn detect(&self, _image: &ImageInput) -> Vec<Region> {
        Vec::new()
    }
}

/// Regions supplied up front, e.g. loaded from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct StaticRegions(pub Vec<Region>);

impl RegionDetector for StaticRegions {
    fn detect(&self, _image: &ImageInput) -> Vec<Region> {
        self.0.clone()
    }
}
