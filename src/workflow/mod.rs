pub mod analysis_flow;
pub mod extraction_flow;

pub use analysis_flow::analyze;
pub use extraction_flow::{Extraction, ExtractionPipeline};
