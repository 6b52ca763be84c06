pub mod binarizer;
pub mod duplicate_clusterer;
pub mod line_reconstructor;
pub mod paper_locator;
pub mod question_segmenter;
pub mod recognition;
pub mod similarity;

pub use binarizer::binarize;
pub use duplicate_clusterer::DuplicateClusterer;
pub use line_reconstructor::LineReconstructor;
pub use paper_locator::{LocatorStrategy, PaperLocator};
pub use recognition::RecognitionAdapter;
pub use similarity::similarity_ratio;
