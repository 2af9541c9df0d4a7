mod registry;
mod selectors;

pub use registry::{ModelRegistry, ModelSpec, DEFAULT_VISION_MODEL};
pub use selectors::{ModelSelection, ModelSelector};
