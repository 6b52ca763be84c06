/// 识别适配服务
///
/// 先用主语言识别，失败后用备用语言重试一次；两次都失败时返回同时包含两个原因的错误
use crate::config::Config;
use crate::error::RecognitionError;
use crate::infrastructure::Recognizer;
use crate::models::Token;
use image::GrayImage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RecognitionAdapter {
    recognizer: Arc<dyn Recognizer>,
    primary_language: String,
    fallback_language: String,
}

impl RecognitionAdapter {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        primary_language: impl Into<String>,
        fallback_language: impl Into<String>,
    ) -> Self {
        Self {
            recognizer,
            primary_language: primary_language.into(),
            fallback_language: fallback_language.into(),
        }
    }

    pub fn from_config(recognizer: Arc<dyn Recognizer>, config: &Config) -> Self {
        Self::new(
            recognizer,
            config.ocr_primary_language.clone(),
            config.ocr_fallback_language.clone(),
        )
    }

    /// 识别二值化后的图片
    ///
    /// # 返回
    /// 返回词级识别结果（顺序与引擎输出一致）
    pub fn recognize(&self, image: &GrayImage) -> Result<Vec<Token>, RecognitionError> {
        match self.recognizer.recognize(image, &self.primary_language) {
            Ok(tokens) => {
                debug!("OCR ({}) 完成，{} 个词", self.primary_language, tokens.len());
                Ok(tokens)
            }
            Err(primary) => {
                warn!(
                    "⚠️ OCR 使用 '{}' 失败，改用 '{}' 重试: {}",
                    self.primary_language, self.fallback_language, primary
                );
                self.recognizer
                    .recognize(image, &self.fallback_language)
                    .map_err(|fallback| RecognitionError::Exhausted {
                        primary: Box::new(primary),
                        fallback: Box::new(fallback),
                    })
            }
        }
    }
}
