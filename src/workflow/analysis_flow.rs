//! 题目频次分析流程 - 流程层
//!
//! 读取某科目的全部试卷，重新切分题目，再按相似度聚类。

use tracing::{info, warn};

use crate::error::AnalysisError;
use crate::infrastructure::DocumentStore;
use crate::models::{AnalysisReport, QuestionInstance};
use crate::services::duplicate_clusterer::{DuplicateClusterer, DEFAULT_SIMILARITY_THRESHOLD};
use crate::services::question_segmenter::extract_instances;

/// 分析某科目的题目出现频次
///
/// # 参数
/// - `store`: 试卷存储
/// - `subject_code`: 科目代码
/// - `similarity_threshold`: 相似度阈值，超出 [0, 1] 时会被截断
///
/// # 返回
/// 返回题目组（按出现次数降序）；科目下没有试卷时返回 `NotFound`
pub async fn analyze(
    store: &dyn DocumentStore,
    subject_code: &str,
    similarity_threshold: f64,
) -> Result<AnalysisReport, AnalysisError> {
    let threshold = clamp_threshold(similarity_threshold);

    let documents = store.find_by_subject(subject_code).await?;
    if documents.is_empty() {
        return Err(AnalysisError::NotFound {
            subject_code: subject_code.to_string(),
        });
    }

    let instances: Vec<QuestionInstance> = documents
        .iter()
        .flat_map(|doc| extract_instances(&doc.full_text, &doc.id, &doc.exam_period))
        .collect();

    let groups = DuplicateClusterer::new(threshold).cluster(&instances);

    info!(
        "📊 {} 分析完成: {} 份试卷，{} 道题，{} 道不同题目",
        subject_code,
        documents.len(),
        instances.len(),
        groups.len()
    );

    Ok(AnalysisReport {
        subject_code: subject_code.to_string(),
        total_tests: documents.len(),
        total_questions: instances.len(),
        unique_questions: groups.len(),
        groups,
    })
}

fn clamp_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        warn!("⚠️ 相似度阈值无效，使用默认值 {}", DEFAULT_SIMILARITY_THRESHOLD);
        return DEFAULT_SIMILARITY_THRESHOLD;
    }
    let clamped = threshold.clamp(0.0, 1.0);
    if clamped != threshold {
        warn!("⚠️ 相似度阈值 {} 超出范围，已截断为 {}", threshold, clamped);
    }
    clamped
}
