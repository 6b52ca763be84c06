use serde::{Deserialize, Serialize};

/// OCR 输出的单词框（像素坐标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// OCR 识别出的一个词
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// 置信度（0-100），引擎未给出时为 0
    pub confidence: i32,
    pub block: u32,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<WordBox>,
}

impl Token {
    pub fn new(text: impl Into<String>, confidence: i32, block: u32, line: u32) -> Self {
        Self {
            text: text.into(),
            confidence,
            block,
            line,
            bbox: None,
        }
    }
}

/// 按阅读顺序重建的一行文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedLine {
    pub block: u32,
    pub line: u32,
    pub text: String,
}
