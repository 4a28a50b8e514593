/// 日志工具模块
///
/// 安装 tracing 订阅器，并提供日志格式化的辅助函数
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// 初始化日志
///
/// - 日志文件每次启动时重写，首行为启动时间
/// - 过滤规则优先取 `RUST_LOG` 环境变量，其次取配置
/// - 开启 `verbose_logging` 时同时输出到 stderr（stdout 留给答题界面）
pub fn init(config: &Config) -> Result<()> {
    init_log_file(&config.output_log_file)?;

    let file = OpenOptions::new()
        .append(true)
        .open(&config.output_log_file)
        .with_context(|| format!("无法打开日志文件: {}", config.output_log_file))?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.rust_log))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);
    let console_layer = config
        .verbose_logging
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("日志系统已初始化")?;

    Ok(())
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n裁判员学习与考试日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 篮球裁判员学习与考试");
    if config.has_llm_credentials() {
        info!("🤖 模型: {} @ {}", config.llm_model_name, config.llm_api_base_url);
    } else {
        info!("🤖 模型: 未配置（离线模式）");
    }
    info!(
        "📝 每场考试 {} 道题，限时 {}",
        config.exam_question_count,
        format_countdown(config.exam_duration_secs)
    );
    info!("📁 数据目录: {}", config.data_dir);
    info!("{}", "=".repeat(60));
}

/// 把剩余秒数格式化为 `MM:SS`
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
