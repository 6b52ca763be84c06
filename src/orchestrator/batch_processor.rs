//! 批量导入处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，持有流水线和存储，负责批量导入和并发控制。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建 OCR 识别器、提取流水线和试卷存储
//! 2. **批量扫描**：找出输入目录中所有支持的扫描件
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总成功/失败数量
//!
//! 单个扫描件的处理委托给 `document_processor`。

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{DocumentStore, Recognizer, TesseractRecognizer, TomlFolderStore};
use crate::models::{AnalysisReport, DocumentMeta, FileKind};
use crate::orchestrator::document_processor::{self, process_document};
use crate::utils::logging::{
    append_log_line, init_log_file, log_batch_complete, log_batch_start, log_scans_found,
    log_startup, print_final_stats,
};
use crate::workflow::{self, Extraction, ExtractionPipeline};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, warn};

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: Arc<ExtractionPipeline>,
    store: Arc<dyn DocumentStore>,
}

/// 导入统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// 成功入库的记录ID（按文件顺序）
    pub stored_ids: Vec<String>,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
    stored_ids: Vec<String>,
}

impl App {
    /// 使用 Tesseract 和文件夹存储初始化应用
    pub fn initialize(config: Config) -> Self {
        let recognizer: Arc<dyn Recognizer> =
            Arc::new(TesseractRecognizer::new(config.tessdata_path.clone()));
        let store: Arc<dyn DocumentStore> = Arc::new(TomlFolderStore::new(&config.store_folder));
        Self::new(config, recognizer, store)
    }

    /// 使用指定的识别器和存储创建应用
    pub fn new(
        config: Config,
        recognizer: Arc<dyn Recognizer>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let pipeline = Arc::new(ExtractionPipeline::new(&config, recognizer));
        Self {
            config,
            pipeline,
            store,
        }
    }

    /// 提取单个文件，不入库
    pub async fn extract_file(&self, path: &Path) -> Result<Extraction> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("无效的文件路径: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("读取文件失败: {}", path.display()))?;

        document_processor::extract_blocking(self.pipeline.clone(), Arc::new(bytes), filename).await
    }

    /// 分析某科目的题目频次
    pub async fn analyze(
        &self,
        subject_code: &str,
        similarity_threshold: f64,
    ) -> AppResult<AnalysisReport> {
        let report =
            workflow::analyze(self.store.as_ref(), subject_code, similarity_threshold).await?;
        Ok(report)
    }

    /// 批量导入输入目录中的所有扫描件
    ///
    /// # 参数
    /// - `meta`: 本批扫描件共用的试卷元数据
    /// - `input_folder`: 输入目录
    pub async fn ingest(&self, meta: &DocumentMeta, input_folder: &Path) -> Result<IngestStats> {
        init_log_file(&self.config.output_log_file, meta)?;
        log_startup(meta, input_folder, self.config.max_concurrent_documents);

        let files = scan_input_folder(input_folder).await?;
        if files.is_empty() {
            warn!("⚠️ {} 中没有找到可导入的扫描件", input_folder.display());
            return Ok(IngestStats::default());
        }

        log_scans_found(files.len(), self.config.max_concurrent_documents);

        let stats = self.process_all_documents(meta, files).await?;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );
        append_log_line(
            &self.config.output_log_file,
            &format!("成功: {}/{}，失败: {}", stats.success, stats.total, stats.failed),
        )?;

        Ok(stats)
    }

    /// 分批处理所有扫描件
    async fn process_all_documents(
        &self,
        meta: &DocumentMeta,
        files: Vec<PathBuf>,
    ) -> Result<IngestStats> {
        let max_concurrent = self.config.max_concurrent_documents.max(1);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let total = files.len();
        let total_batches = total.div_ceil(max_concurrent);
        let mut stats = IngestStats {
            total,
            ..Default::default()
        };

        for (batch_idx, batch) in files.chunks(max_concurrent).enumerate() {
            let batch_start = batch_idx * max_concurrent;
            log_batch_start(batch_idx + 1, total_batches, batch);

            let result = self
                .process_batch(meta, batch, batch_start, semaphore.clone())
                .await?;

            stats.success += result.success;
            stats.failed += result.failed;
            stats.stored_ids.extend(result.stored_ids);

            log_batch_complete(batch_idx + 1, result.success, result.success + result.failed);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        meta: &DocumentMeta,
        batch: &[PathBuf],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut handles = Vec::new();

        for (idx, path) in batch.iter().enumerate() {
            let doc_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let pipeline = self.pipeline.clone();
            let store = self.store.clone();
            let meta = meta.clone();
            let path = path.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                process_document(pipeline, store.as_ref(), &path, &meta, doc_index)
                    .await
                    .map_err(|e| {
                        error!("[文件 {}] ❌ 导入失败 {}: {:#}", doc_index, path.display(), e);
                        format!("{}: {:#}", path.display(), e)
                    })
            });
            handles.push((doc_index, handle));
        }

        // 等待本批所有任务完成
        let (indices, handles): (Vec<usize>, Vec<_>) = handles.into_iter().unzip();
        let outcomes = join_all(handles).await;

        let mut result = BatchResult::default();
        for (doc_index, outcome) in indices.into_iter().zip(outcomes) {
            match outcome {
                Ok(Ok(id)) => {
                    result.success += 1;
                    result.stored_ids.push(id);
                }
                Ok(Err(message)) => {
                    result.failed += 1;
                    append_log_line(&self.config.output_log_file, &format!("❌ {}", message))?;
                }
                Err(e) => {
                    error!("[文件 {}] 任务执行失败: {}", doc_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 列出目录中扩展名受支持的文件，按文件名排序
async fn scan_input_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .with_context(|| format!("无法读取输入目录: {}", folder.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let supported = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(FileKind::from_filename)
            .is_some();
        if supported {
            files.push(path);
        } else {
            warn!("跳过不支持的文件: {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}
