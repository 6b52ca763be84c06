use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文本提取流水线错误
    #[error("提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 题目分析错误
    #[error("分析错误: {0}")]
    Analysis(#[from] AnalysisError),
    /// 存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 文件解码错误
#[derive(Debug, Error)]
pub enum DecodeError {
    /// 输入字节为空
    #[error("输入文件为空: {filename}")]
    Empty { filename: String },
    /// 不支持的文件类型
    #[error("不支持的文件类型 '{extension}'，允许的类型: {allowed}")]
    UnsupportedFormat { extension: String, allowed: String },
    /// 图片字节损坏或无法识别
    #[error("无法解码图片 {filename}: {source}")]
    CorruptImage {
        filename: String,
        #[source]
        source: image::ImageError,
    },
    /// PDF 结构无法解析
    #[error("无法解析 PDF {filename}: {source}")]
    CorruptPdf {
        filename: String,
        #[source]
        source: lopdf::Error,
    },
    /// PDF 第一页中没有可用的扫描图片
    #[error("PDF {filename} 第一页中没有可解码的图片")]
    NoPdfImage { filename: String },
}

/// OCR 识别错误
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// 引擎初始化失败（例如缺少语言包）
    #[error("OCR 引擎初始化失败 (语言: {language}): {message}")]
    InitFailed { language: String, message: String },
    /// 识别过程失败
    #[error("OCR 识别失败 (语言: {language}): {message}")]
    EngineFailed { language: String, message: String },
    /// 主语言与备用语言均失败
    #[error("主语言与备用语言均识别失败: 主语言错误 [{primary}]，备用语言错误 [{fallback}]")]
    Exhausted {
        primary: Box<RecognitionError>,
        fallback: Box<RecognitionError>,
    },
}

/// 单个文档的提取错误（终止性）
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
    /// 流程完成但没有识别出任何非空白文本
    #[error("未能从文件 {filename} 中提取到任何文本")]
    EmptyResult { filename: String },
}

/// 题目分析错误
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 科目下没有任何试卷
    #[error("科目 {subject_code} 下没有找到任何试卷")]
    NotFound { subject_code: String },
    /// 读取存储失败
    #[error("读取试卷存储失败: {0}")]
    Store(#[from] StoreError),
}

/// 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 序列化失败
    #[error("TOML序列化失败 ({path}): {source}")]
    TomlSerializeFailed {
        path: String,
        #[source]
        source: toml::ser::Error,
    },
    /// 记录不存在
    #[error("试卷记录不存在: {id}")]
    NotFound { id: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 取值超出范围
    #[error("配置项 {name} 的值 {value} 超出范围 {range}")]
    OutOfRange {
        name: String,
        value: String,
        range: String,
    },
}

// ========== 便捷构造函数 ==========

impl StoreError {
    /// 创建文件读取错误
    pub fn read_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        StoreError::ReadFailed {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// 创建文件写入错误
    pub fn write_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        StoreError::WriteFailed {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl RecognitionError {
    /// 创建引擎识别失败错误
    pub fn engine_failed(language: impl Into<String>, message: impl ToString) -> Self {
        RecognitionError::EngineFailed {
            language: language.into(),
            message: message.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
