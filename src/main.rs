use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use exam_ingest::{logger, App, Config, DocumentMeta, TestType};

/// 试卷扫描件导入与重复题目分析
#[derive(Parser, Debug)]
#[command(name = "exam-ingest", version, about)]
struct Cli {
    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    /// 试卷存储目录（覆盖 STORE_FOLDER）
    #[arg(long, global = true)]
    store: Option<String>,

    /// OCR 主语言（覆盖 OCR_PRIMARY_LANGUAGE）
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 提取单个文件并输出分题后的全文
    Extract {
        file: PathBuf,
        /// 输出 OCR 原文而不是分题全文
        #[arg(long)]
        raw: bool,
    },
    /// 批量导入目录中的扫描件
    Ingest {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        exam_period: String,
        #[arg(long)]
        academic_year: String,
        /// regular / makeup / midterm / final / practical
        #[arg(long, default_value = "regular")]
        test_type: String,
        /// 输入目录（覆盖 INPUT_FOLDER）
        #[arg(long)]
        input: Option<String>,
        /// 最大并发数（覆盖 MAX_CONCURRENT_DOCUMENTS）
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// 分析科目的题目出现频次，输出 JSON
    Analyze {
        subject: String,
        /// 相似度阈值 0-1（覆盖 SIMILARITY_THRESHOLD）
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::from_env();
    config.verbose_logging |= cli.verbose;
    if let Some(store) = cli.store {
        config.store_folder = store;
    }
    if let Some(lang) = cli.lang {
        config.ocr_primary_language = lang;
    }

    // 初始化日志
    logger::init(config.verbose_logging);
    config.validate()?;

    match cli.command {
        Command::Extract { file, raw } => {
            let app = App::initialize(config);
            let extraction = app.extract_file(&file).await?;
            println!("{}", if raw { extraction.raw_text } else { extraction.full_text });
        }
        Command::Ingest {
            subject,
            exam_period,
            academic_year,
            test_type,
            input,
            concurrency,
        } => {
            if let Some(input) = input {
                config.input_folder = input;
            }
            if let Some(concurrency) = concurrency.filter(|c| *c > 0) {
                config.max_concurrent_documents = concurrency;
            }
            let meta = DocumentMeta {
                subject_code: subject,
                exam_period,
                academic_year,
                test_type: TestType::parse_or_regular(&test_type),
            };
            let input_folder = PathBuf::from(&config.input_folder);

            let app = App::initialize(config);
            let stats = app.ingest(&meta, &input_folder).await?;
            if stats.failed > 0 {
                anyhow::bail!("{} 个文件导入失败", stats.failed);
            }
        }
        Command::Analyze { subject, threshold } => {
            let threshold = threshold.unwrap_or(config.similarity_threshold);
            let app = App::initialize(config);
            let report = app.analyze(&subject, threshold).await?;
            let json = serde_json::to_string_pretty(&report).context("序列化分析结果失败")?;
            println!("{}", json);
        }
    }

    Ok(())
}
