//! 文本提取流程 - 流程层
//!
//! 核心职责：定义"一份扫描件"的完整处理流程
//!
//! 流程顺序：
//! 1. 解码（图片 / PDF 第一页）
//! 2. 定位试卷区域
//! 3. 二值化
//! 4. OCR（主语言 → 备用语言）
//! 5. 重建行
//! 6. 切分题目，生成规范全文
//!
//! 整个流程是同步的 CPU 密集计算，调用方负责把它放到阻塞线程池中执行。

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ExtractionError;
use crate::infrastructure::{decode, Recognizer};
use crate::models::{QuestionBlock, Rect};
use crate::services::question_segmenter::{compose_full_text, segment};
use crate::services::{binarize, LineReconstructor, PaperLocator, RecognitionAdapter};
use crate::utils::truncate_text;

/// 一份扫描件的提取结果
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// 按阅读顺序重建的 OCR 原文
    pub raw_text: String,
    /// 切分出的题目块
    pub blocks: Vec<QuestionBlock>,
    /// 规范全文（题目之间空一行），也是持久化的文本
    pub full_text: String,
    /// 实际参与识别的区域
    pub region: Rect,
}

/// 文本提取流水线
///
/// 不持有可变状态，可以通过 `Arc` 在多个线程间共享并发调用
pub struct ExtractionPipeline {
    locator: PaperLocator,
    recognition: RecognitionAdapter,
    reconstructor: LineReconstructor,
}

impl ExtractionPipeline {
    /// 创建流水线
    ///
    /// # 参数
    /// - `config`: 配置（语言、置信度阈值）
    /// - `recognizer`: 注入的 OCR 能力
    pub fn new(config: &Config, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            locator: PaperLocator::new(),
            recognition: RecognitionAdapter::from_config(recognizer, config),
            reconstructor: LineReconstructor::new(config.min_token_confidence),
        }
    }

    /// 处理一份扫描件
    ///
    /// # 参数
    /// - `bytes`: 文件原始字节
    /// - `filename`: 原始文件名（决定文件类型）
    ///
    /// # 返回
    /// 成功时返回原文、题目块和规范全文；OCR 没有得到任何文字时返回 `EmptyResult`
    pub fn extract(&self, bytes: &[u8], filename: &str) -> Result<Extraction, ExtractionError> {
        info!("📄 开始处理: {} ({} 字节)", filename, bytes.len());
        let raw = decode(bytes, filename)?;
        self.extract_image(&raw.pixels, filename)
    }

    /// 处理已解码的图片
    pub fn extract_image(
        &self,
        image: &RgbImage,
        filename: &str,
    ) -> Result<Extraction, ExtractionError> {
        let region = self.locator.locate(image);
        let binary = binarize(&region.pixels);
        let tokens = self.recognition.recognize(&binary)?;

        let raw_text = self.reconstructor.page_text(&tokens);
        if raw_text.trim().is_empty() {
            return Err(ExtractionError::EmptyResult {
                filename: filename.to_string(),
            });
        }
        debug!("OCR 原文: {}", truncate_text(&raw_text, 80));

        let blocks = segment(&raw_text);
        let full_text = compose_full_text(&blocks);
        info!(
            "✓ {} 提取完成: {} 行原文，{} 道题",
            filename,
            raw_text.lines().count(),
            blocks.len()
        );

        Ok(Extraction {
            raw_text,
            blocks,
            full_text,
            region: region.rect,
        })
    }

    /// 只返回规范全文
    pub fn extract_text(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
        self.extract(bytes, filename).map(|extraction| extraction.full_text)
    }
}
