use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::TestType;

/// 已入库的试卷记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub subject_code: String,
    /// 考试期次，如 "Januarski 2024"
    pub exam_period: String,
    /// 学年，如 "2023/2024"
    pub academic_year: String,
    pub test_type: TestType,
    /// 分题后的全文（题目之间以空行分隔）
    pub full_text: String,
    pub file_extension: String,
    pub created_at: DateTime<Local>,
    /// 原始扫描件字节，单独存放，不进入 TOML
    #[serde(skip_serializing, skip_deserializing)]
    pub raw_file_bytes: Vec<u8>,
}

/// 导入时由调用方提供的试卷元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub subject_code: String,
    pub exam_period: String,
    pub academic_year: String,
    pub test_type: TestType,
}

impl StoredDocument {
    /// 由元数据、提取结果和原始文件构建记录
    pub fn new(
        meta: &DocumentMeta,
        full_text: String,
        file_extension: impl Into<String>,
        raw_file_bytes: Vec<u8>,
    ) -> Self {
        let created_at = Local::now();
        Self {
            id: generate_id(&meta.subject_code, created_at),
            subject_code: meta.subject_code.clone(),
            exam_period: meta.exam_period.clone(),
            academic_year: meta.academic_year.clone(),
            test_type: meta.test_type,
            full_text,
            file_extension: file_extension.into().to_lowercase(),
            created_at,
            raw_file_bytes,
        }
    }

    /// 原始文件的 MIME 类型
    pub fn mime_type(&self) -> &'static str {
        crate::models::file_kind::mime_type_for_extension(&self.file_extension)
    }
}

/// 生成记录ID：科目代码 + 时间戳 + 进程内序号，可直接用作文件名
fn generate_id(subject_code: &str, created_at: DateTime<Local>) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let safe_subject: String = subject_code
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}-{}-{:04}",
        safe_subject,
        created_at.format("%Y%m%d%H%M%S%3f"),
        seq
    )
}
