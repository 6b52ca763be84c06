/// 行重建服务
///
/// 把无序的识别词按 (块号, 行号) 重新组成阅读顺序的行
use crate::models::{ReconstructedLine, Token};
use std::collections::BTreeMap;
use tracing::debug;

/// 默认最低置信度
pub const DEFAULT_MIN_CONFIDENCE: i32 = 30;

pub struct LineReconstructor {
    min_confidence: i32,
}

impl Default for LineReconstructor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONFIDENCE)
    }
}

impl LineReconstructor {
    pub fn new(min_confidence: i32) -> Self {
        Self { min_confidence }
    }

    /// 重建行，按 (块号, 行号) 升序输出
    ///
    /// 置信度低于阈值或去空白后为空的词会被丢弃；同一行内保持引擎输出顺序
    pub fn reconstruct(&self, tokens: &[Token]) -> Vec<ReconstructedLine> {
        let mut groups: BTreeMap<(u32, u32), Vec<&str>> = BTreeMap::new();
        let mut dropped = 0usize;

        for token in tokens {
            let text = token.text.trim();
            if token.confidence < self.min_confidence || text.is_empty() {
                dropped += 1;
                continue;
            }
            groups.entry((token.block, token.line)).or_default().push(text);
        }

        if dropped > 0 {
            debug!("丢弃 {} 个低置信度或空白的词", dropped);
        }

        groups
            .into_iter()
            .map(|((block, line), words)| ReconstructedLine {
                block,
                line,
                text: words.join(" "),
            })
            .collect()
    }

    /// 重建整页文本，行之间以换行分隔；没有可用的词时返回空串
    pub fn page_text(&self, tokens: &[Token]) -> String {
        self.reconstruct(tokens)
            .into_iter()
            .map(|line| line.text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
