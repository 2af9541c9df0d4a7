pub mod aggregate;
pub mod assembler;
pub mod config;
pub mod detector;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod generative;
pub mod heuristics;
pub mod image_input;
pub mod prompts;
pub mod sanitize;
pub mod validate;

pub use assembler::{AnalysisOptions, ReportAssembler};
pub use config::{GenerativeConfig, RetryPolicy};
pub use detector::{NoRegions, RegionDetector, StaticRegions};
pub use error::{AnalysisError, GenerativeError, ModelCallError};
pub use generative::{GenerativeAnalysis, GenerativeClient, GenerativeOutcome, VisionModel};
pub use image_input::ImageInput;

/// Capability tag the model registry uses for screenshot-capable models.
pub const VISION_CAPABILITY: &str = "vision";
