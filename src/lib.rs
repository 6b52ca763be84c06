//! # Exam Ingest
//!
//! 试卷扫描件导入与重复题目分析
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部能力，只暴露能力
//! - `decode` - 文件格式检查与解码（图片 / PDF 第一页）
//! - `Recognizer` - OCR 能力接口，`TesseractRecognizer` 为默认实现
//! - `DocumentStore` - 试卷存储接口
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `PaperLocator` - 试卷区域定位（颜色掩码 / 边缘轮廓 / 白边裁剪）
//! - `binarize` - Otsu 二值化
//! - `RecognitionAdapter` - 主语言识别，失败后改用备用语言
//! - `LineReconstructor` - 按 (块, 行) 重建阅读顺序
//! - `question_segmenter` - 按题号切分题目
//! - `DuplicateClusterer` - 相似题目聚类
//!
//! ### ③ 流程层（Workflow）
//! - `ExtractionPipeline` - 一份扫描件的完整提取流程
//! - `analyze` - 一个科目的题目频次分析
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量导入，管理资源和并发
//! - `orchestrator/document_processor` - 单个扫描件导入
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{
    DocumentStore, InMemoryStore, Recognizer, TesseractRecognizer, TomlFolderStore,
};
pub use models::{
    AnalysisReport, DocumentMeta, QuestionBlock, QuestionGroup, StoredDocument, TestType, Token,
};
pub use orchestrator::{App, IngestStats};
pub use workflow::{analyze, Extraction, ExtractionPipeline};
