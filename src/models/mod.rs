pub mod document;
pub mod file_kind;
pub mod loaders;
pub mod question;
pub mod region;
pub mod test_type;
pub mod token;

pub use document::{DocumentMeta, StoredDocument};
pub use file_kind::FileKind;
pub use question::{AnalysisReport, QuestionBlock, QuestionGroup, QuestionInstance};
pub use region::{RawImage, Rect, Region};
pub use test_type::TestType;
pub use token::{ReconstructedLine, Token, WordBox};
