//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量导入处理器
//! - 管理应用资源（提取流水线、试卷存储）
//! - 扫描输入目录
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `document_processor` - 单个扫描件处理器
//! - 在阻塞线程池中运行提取流水线
//! - 构建试卷记录并入库
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PathBuf>)
//!     ↓
//! document_processor (处理单个文件)
//!     ↓
//! workflow::ExtractionPipeline (decode → locate → binarize → OCR → lines → questions)
//!     ↓
//! services (能力层：定位 / 二值化 / 识别 / 重建 / 切分 / 聚类)
//!     ↓
//! infrastructure (基础设施：解码、Tesseract、存储)
//! ```

pub mod batch_processor;
pub mod document_processor;

pub use batch_processor::{App, IngestStats};
pub use document_processor::process_document;
