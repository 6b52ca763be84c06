//! 基础设施层
//!
//! 持有外部能力（OCR 引擎、文件解码、存储），只暴露能力，不认识题目和流程。

pub mod decoder;
pub mod document_store;
pub mod recognizer;
pub mod tesseract;

pub use decoder::decode;
pub use document_store::{DocumentStore, InMemoryStore, TomlFolderStore};
pub use recognizer::Recognizer;
pub use tesseract::TesseractRecognizer;
