use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的试卷数量
    pub max_concurrent_documents: usize,
    /// 待导入扫描件所在目录
    pub input_folder: String,
    /// 试卷记录存储目录
    pub store_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- OCR 配置 ---
    pub ocr_primary_language: String,
    pub ocr_fallback_language: String,
    /// tessdata 目录，为空时使用 Tesseract 默认路径
    pub tessdata_path: Option<String>,
    /// 低于该置信度的识别词会被丢弃（0-100）
    pub min_token_confidence: i32,
    // --- 分析配置 ---
    /// 判定为同一题目的相似度阈值（0-1）
    pub similarity_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_documents: 4,
            input_folder: "scans".to_string(),
            store_folder: "store".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            ocr_primary_language: "srp".to_string(),
            ocr_fallback_language: "eng".to_string(),
            tessdata_path: None,
            min_token_confidence: 30,
            similarity_threshold: 0.85,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_documents: std::env::var("MAX_CONCURRENT_DOCUMENTS").ok().and_then(|v| v.parse().ok()).filter(|v| *v > 0).unwrap_or(default.max_concurrent_documents),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            store_folder: std::env::var("STORE_FOLDER").unwrap_or(default.store_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            ocr_primary_language: std::env::var("OCR_PRIMARY_LANGUAGE").unwrap_or(default.ocr_primary_language),
            ocr_fallback_language: std::env::var("OCR_FALLBACK_LANGUAGE").unwrap_or(default.ocr_fallback_language),
            tessdata_path: std::env::var("TESSDATA_PATH").ok().filter(|v| !v.is_empty()),
            min_token_confidence: std::env::var("MIN_TOKEN_CONFIDENCE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.min_token_confidence),
            similarity_threshold: std::env::var("SIMILARITY_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.similarity_threshold),
        }
    }
}

impl Config {
    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::OutOfRange {
                name: "SIMILARITY_THRESHOLD".to_string(),
                value: self.similarity_threshold.to_string(),
                range: "[0, 1]".to_string(),
            });
        }
        if !(0..=100).contains(&self.min_token_confidence) {
            return Err(ConfigError::OutOfRange {
                name: "MIN_TOKEN_CONFIDENCE".to_string(),
                value: self.min_token_confidence.to_string(),
                range: "[0, 100]".to_string(),
            });
        }
        Ok(())
    }
}
