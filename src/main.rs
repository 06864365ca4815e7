//! 程序入口：初始化日志、解析命令行并调度各子命令

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::SubscriberBuilder;

use fanyi_guanli::io::export::export_zip_file;
use fanyi_guanli::io::import::{import_dir, import_zip_file, ImportOutcome};
use fanyi_guanli::io::snapshot::{load_snapshot, save_snapshot};
use fanyi_guanli::llm::batch::{
    analyze_keys, bulk_translate, DEFAULT_CHUNK_DELAY, DEFAULT_CHUNK_SIZE,
};
use fanyi_guanli::llm::client::OpenAiClient;
use fanyi_guanli::model::edit::{coerce_edit, ValueKind};
use fanyi_guanli::model::locate::locate_line;
use fanyi_guanli::utils::fs::write_json_file;
use fanyi_guanli::ProjectState;

#[derive(Parser)]
#[command(name = "fanyi_guanli", about = "多语言JSON翻译管理工具", version)]
struct Cli {
    /// 项目目录或ZIP归档
    #[arg(global = true, long, default_value = ".")]
    project: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 列出全部语言文件的叶子键全集
    Keys,
    /// 读取某语言在某键路径下的值
    Get { lang: String, key: String },
    /// 写入某语言在某键路径下的值（按旧值类型解析输入文本）并回写文件
    Set {
        lang: String,
        key: String,
        value: String,
    },
    /// 查找键在语言文件规范化输出中的行号
    Locate { lang: String, key: String },
    /// 导出整个项目为ZIP归档
    Export { out: PathBuf },
    /// 保存会话快照
    Save { out: PathBuf },
    /// 从会话快照恢复并打印概要
    Load { snapshot: PathBuf },
    /// 对一组键调用LLM评审（需要 OPENAI_API_KEY）
    Analyze {
        /// 参考语言（源语言）
        #[arg(long)]
        reference: String,
        /// 待分析的键路径，留空表示全集
        keys: Vec<String>,
    },
    /// 批量翻译到目标语言（需要 OPENAI_API_KEY）
    Translate {
        #[arg(long)]
        reference: String,
        #[arg(long)]
        target: String,
        /// 待翻译的键路径，留空表示全集
        keys: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
}

/// 打开项目（目录或ZIP），逐文件问题打到日志
fn open_project(path: &PathBuf) -> anyhow::Result<ProjectState> {
    let outcome: ImportOutcome = if path.extension().is_some_and(|e| e == "zip") {
        import_zip_file(path)?
    } else {
        import_dir(path)?
    };
    for issue in &outcome.issues {
        tracing::warn!("{}: {}", issue.file, issue.message);
    }
    Ok(outcome.state)
}

fn client_from_env() -> anyhow::Result<OpenAiClient> {
    let api_key = std::env::var("OPENAI_API_KEY").context("缺少环境变量 OPENAI_API_KEY")?;
    Ok(OpenAiClient::new(api_key))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Command::Keys => {
            let state = open_project(&cli.project)?;
            for key in state.key_universe() {
                println!("{}", key);
            }
        }
        Command::Get { lang, key } => {
            let state = open_project(&cli.project)?;
            match state.value_of(&lang, &key)? {
                Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
                None => println!("未找到"),
            }
        }
        Command::Set { lang, key, value } => {
            let mut state = open_project(&cli.project)?;
            let kind = ValueKind::of(state.value_of(&lang, &key)?);
            state.set_value(&lang, &key, coerce_edit(kind, &value))?;
            let file = state
                .file(&lang)
                .context("语言文件在写入后不可见")?;
            write_json_file(&cli.project.join(format!("{}.json", lang)), &file.data)?;
            println!("已更新 {} 的 {}", lang, key);
        }
        Command::Locate { lang, key } => {
            let state = open_project(&cli.project)?;
            let file = state
                .file(&lang)
                .with_context(|| format!("语言文件不存在: {}", lang))?;
            let text = serde_json::to_string_pretty(&file.data)?;
            match locate_line(&text, &key) {
                Some(line) => println!("{}", line),
                None => println!("未找到"),
            }
        }
        Command::Export { out } => {
            let state = open_project(&cli.project)?;
            export_zip_file(&state, &out)?;
            println!("已导出到 {}", out.display());
        }
        Command::Save { out } => {
            let state = open_project(&cli.project)?;
            save_snapshot(&out, &state)?;
        }
        Command::Load { snapshot } => {
            let state = load_snapshot(&snapshot)?;
            println!(
                "{} 个语言文件，{} 个键，参考语言: {}",
                state.files.len(),
                state.key_universe().len(),
                state.reference_language().unwrap_or("未设定")
            );
        }
        Command::Analyze { reference, keys } => {
            let mut state = open_project(&cli.project)?;
            state.set_reference_language(&reference)?;
            let keys = if keys.is_empty() {
                state.key_universe().to_vec()
            } else {
                keys
            };
            let client = client_from_env()?;
            let outcome = analyze_keys(&client, &state, &keys, None).await?;
            for (key, verdicts) in &outcome.verdicts {
                for v in verdicts {
                    let suggestion = v
                        .suggestion
                        .as_deref()
                        .map(|s| format!("（建议: {}）", s))
                        .unwrap_or_default();
                    println!(
                        "{} [{}] {:?}: {}{}",
                        key, v.language, v.severity, v.feedback, suggestion
                    );
                }
            }
            for (key, error) in &outcome.failures {
                eprintln!("{}: {}", key, error);
            }
        }
        Command::Translate {
            reference,
            target,
            keys,
            chunk_size,
        } => {
            let mut state = open_project(&cli.project)?;
            state.set_reference_language(&reference)?;
            let keys = if keys.is_empty() {
                state.key_universe().to_vec()
            } else {
                keys
            };
            let client = client_from_env()?;
            let outcome = bulk_translate(
                &client,
                &state,
                &target,
                &keys,
                chunk_size,
                DEFAULT_CHUNK_DELAY,
            )
            .await?;
            for (key, suggestion) in &outcome.suggestions {
                println!("{} = {}", key, suggestion);
            }
            for failure in &outcome.failures {
                eprintln!("失败块（{} 个键）: {}", failure.keys.len(), failure.error);
            }
        }
    }
    Ok(())
}
