//! 单个扫描件处理器 - 编排层
//!
//! ## 职责
//!
//! 读取一份扫描件，在阻塞线程池中运行提取流水线，
//! 成功后构建试卷记录并写入存储。提取失败的文件不会入库。

use crate::infrastructure::DocumentStore;
use crate::models::file_kind::extension_of;
use crate::models::{DocumentMeta, StoredDocument};
use crate::workflow::{Extraction, ExtractionPipeline};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 在阻塞线程池中运行提取流水线
///
/// OCR 单次调用可能耗时数秒，不能占用异步运行时的工作线程
pub async fn extract_blocking(
    pipeline: Arc<ExtractionPipeline>,
    bytes: Arc<Vec<u8>>,
    filename: String,
) -> Result<Extraction> {
    let display_name = filename.clone();
    let extraction = tokio::task::spawn_blocking(move || pipeline.extract(&bytes, &filename))
        .await
        .with_context(|| format!("提取任务异常退出: {}", display_name))??;
    Ok(extraction)
}

/// 导入单个扫描件
///
/// # 参数
/// - `pipeline`: 提取流水线
/// - `store`: 试卷存储
/// - `path`: 扫描件路径
/// - `meta`: 试卷元数据
/// - `doc_index`: 文件序号（用于日志）
///
/// # 返回
/// 返回已入库记录的ID
pub async fn process_document(
    pipeline: Arc<ExtractionPipeline>,
    store: &dyn DocumentStore,
    path: &Path,
    meta: &DocumentMeta,
    doc_index: usize,
) -> Result<String> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("无效的文件路径: {}", path.display()))?;

    info!("[文件 {}] 📄 开始导入: {}", doc_index, filename);

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("读取文件失败: {}", path.display()))?;
    let bytes = Arc::new(bytes);

    let extraction = extract_blocking(pipeline, bytes.clone(), filename.clone()).await?;

    let raw_file_bytes = Arc::try_unwrap(bytes).unwrap_or_else(|shared| shared.as_ref().clone());
    let document = StoredDocument::new(
        meta,
        extraction.full_text,
        extension_of(&filename),
        raw_file_bytes,
    );
    let id = document.id.clone();

    store
        .insert(document)
        .await
        .with_context(|| format!("保存试卷记录失败: {}", filename))?;

    info!(
        "[文件 {}] ✅ 导入成功: {} → {} ({} 道题)",
        doc_index,
        filename,
        id,
        extraction.blocks.len()
    );
    Ok(id)
}
