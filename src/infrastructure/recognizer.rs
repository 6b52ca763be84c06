//! OCR 能力接口 - 基础设施层
//!
//! 流水线只依赖这个 trait，具体引擎由调用方注入。

use crate::error::RecognitionError;
use crate::models::Token;
use image::GrayImage;

/// 词级 OCR 能力
///
/// 给定一张图片和语言代码，返回带置信度、块号、行号的识别词。
/// 实现必须可以跨线程共享，流水线会在阻塞线程池中调用它。
pub trait Recognizer: Send + Sync {
    fn recognize(&self, image: &GrayImage, language: &str) -> Result<Vec<Token>, RecognitionError>;
}

impl<R: Recognizer + ?Sized> Recognizer for std::sync::Arc<R> {
    fn recognize(&self, image: &GrayImage, language: &str) -> Result<Vec<Token>, RecognitionError> {
        (**self).recognize(image, language)
    }
}
