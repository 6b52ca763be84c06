//! 导入日志工具
//!
//! 控制台横幅走 tracing，导入结果同时追加到日志文件里，方便事后查看哪些扫描件失败了。

use crate::models::DocumentMeta;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;

const WIDTH: usize = 60;

fn heavy_rule() -> String {
    "=".repeat(WIDTH)
}

fn light_rule() -> String {
    "─".repeat(WIDTH)
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 新建导入日志文件，写入本次导入的科目和期次
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `meta`: 本批扫描件的元数据
pub fn init_log_file(log_file_path: &str, meta: &DocumentMeta) -> Result<()> {
    let header = format!(
        "{rule}\n扫描件导入 {subject} / {period} ({year}, {kind}) - {time}\n{rule}\n\n",
        rule = heavy_rule(),
        subject = meta.subject_code,
        period = meta.exam_period,
        year = meta.academic_year,
        kind = meta.test_type.name(),
        time = now(),
    );
    fs::write(log_file_path, header)
        .with_context(|| format!("无法创建日志文件: {}", log_file_path))?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path))?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// 导入开始横幅
pub fn log_startup(meta: &DocumentMeta, input_folder: &Path, max_concurrent: usize) {
    info!("{}", heavy_rule());
    info!("🚀 开始导入 {} / {}", meta.subject_code, meta.exam_period);
    info!("📂 输入目录: {}", input_folder.display());
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", heavy_rule());
}

/// 记录找到的扫描件数量
pub fn log_scans_found(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个扫描件，每批 {} 个", total, max_concurrent);
}

/// 记录批次开始，列出本批的文件名
///
/// # 参数
/// - `batch_num`: 批次编号（从 1 开始）
/// - `total_batches`: 批次总数
/// - `files`: 本批扫描件
pub fn log_batch_start(batch_num: usize, total_batches: usize, files: &[impl AsRef<Path>]) {
    let names: Vec<String> = files
        .iter()
        .filter_map(|path| path.as_ref().file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    info!("{}", light_rule());
    info!("📦 第 {}/{} 批: {}", batch_num, total_batches, names.join(", "));
}

pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("✓ 第 {} 批完成: 入库 {}/{}", batch_num, success, total);
}

/// 打印导入汇总
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("{}", heavy_rule());
    info!("📊 导入完成 ({})", now());
    info!("✅ 入库: {}/{}", success, total);
    if failed > 0 {
        info!("❌ 失败: {}，详见 {}", failed, log_file_path);
    }
    info!("{}", heavy_rule());
}

/// 截断长文本用于日志显示（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestType;

    #[test]
    fn test_truncate_text_counts_chars_not_bytes() {
        assert_eq!(truncate_text("Šta je rekurzija?", 3), "Šta...");
        assert_eq!(truncate_text("kratko", 10), "kratko");
    }

    #[test]
    fn test_log_file_header_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        let path = path.to_str().unwrap();
        let meta = DocumentMeta {
            subject_code: "CS302".to_string(),
            exam_period: "Jun 2024".to_string(),
            academic_year: "2023/2024".to_string(),
            test_type: TestType::Makeup,
        };

        init_log_file(path, &meta).unwrap();
        append_log_line(path, "❌ scan.png: empty").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with(&heavy_rule()));
        assert!(content.contains("CS302 / Jun 2024 (2023/2024, makeup)"));
        assert!(content.ends_with("❌ scan.png: empty\n"));
    }
}
