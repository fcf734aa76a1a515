pub mod pipeline;
pub mod types;

pub use pipeline::SegPipeline;
pub use types::{PredictionResult, PLACEHOLDER_CONFIDENCE, PLACEHOLDER_LABEL};
