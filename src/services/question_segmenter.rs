//! 题目切分服务
//!
//! 以 "<题号>. " 开头的行开启新题，之后的行归入当前题，直到下一道题。
//! 第一道题之前的行被丢弃。

use crate::models::{QuestionBlock, QuestionInstance};
use regex::Regex;
use std::sync::OnceLock;

/// 切分整页文本时使用的题号格式
fn block_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.\s*(.*)").expect("题号正则无效"))
}

/// 分析时额外接受不带句点的题号（"12 题目"）
fn instance_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)(?:\.\s*|\s+)(.*)$").expect("题号正则无效"))
}

/// 把文本切分成题目块
pub fn segment(text: &str) -> Vec<QuestionBlock> {
    let mut blocks: Vec<QuestionBlock> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = block_start_regex().captures(line) {
            let number = &caps[1];
            blocks.push(QuestionBlock::new(number, format!("{}. {}", number, &caps[2])));
        } else if let Some(current) = blocks.last_mut() {
            current.lines.push(line.to_string());
        }
    }

    blocks
}

/// 拼接成规范全文：题目之间空一行
pub fn compose_full_text(blocks: &[QuestionBlock]) -> String {
    blocks
        .iter()
        .map(QuestionBlock::text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 切分并直接返回规范全文
pub fn segment_to_full_text(text: &str) -> String {
    compose_full_text(&segment(text))
}

/// 从已保存的全文中重新切出题目实例
///
/// 空行是题目边界，只有每段的第一行会去掉题号（带或不带句点），
/// 续行以单个空格拼接；内容为空的题目被跳过
pub fn extract_instances(
    full_text: &str,
    test_id: &str,
    exam_period: &str,
) -> Vec<QuestionInstance> {
    let mut chunks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in full_text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .map(|lines| {
            let mut parts: Vec<&str> = Vec::with_capacity(lines.len());
            if let Some((first, rest)) = lines.split_first() {
                match instance_start_regex().captures(first) {
                    Some(caps) => parts.push(caps.get(2).map_or("", |m| m.as_str().trim())),
                    None => parts.push(*first),
                }
                parts.extend(rest.iter().copied());
            }
            parts.into_iter().filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ")
        })
        .filter(|text| !text.is_empty())
        .map(|text| QuestionInstance {
            text,
            test_id: test_id.to_string(),
            exam_period: exam_period.to_string(),
        })
        .collect()
}
