use serde::Deserialize;
use std::path::Path;

use crate::error::{AppResult, ConfigError};

/// 默认配置文件路径（可通过 `REF7_CONFIG` 覆盖）
pub const DEFAULT_CONFIG_FILE: &str = "ref7.toml";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次调用超时（秒），0 表示不设超时
    pub llm_timeout_secs: u64,
    /// 失败前的最大尝试次数（至少 1 次）
    pub llm_max_attempts: u32,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- 考试配置 ---
    /// 每场考试请求的题目数量
    pub exam_question_count: usize,
    /// 考试时长（秒）
    pub exam_duration_secs: u32,
    /// 生成内容使用的语言
    pub content_language: String,
    // --- 存储与日志 ---
    /// 自定义资料的存放目录
    pub data_dir: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否在终端显示日志
    pub verbose_logging: bool,
    /// 日志过滤级别（RUST_LOG 语法）
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            llm_timeout_secs: 60,
            llm_max_attempts: 1,
            llm_temperature: 0.7,
            llm_max_tokens: 4096,
            exam_question_count: 10,
            exam_duration_secs: 600,
            content_language: "简体中文".to_string(),
            data_dir: "data".to_string(),
            output_log_file: "ref7.log".to_string(),
            verbose_logging: false,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("REF7_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = Self::from_file(Path::new(&path))?.unwrap_or_default();
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取配置，文件不存在时返回 `None`
    pub fn from_file(path: &Path) -> AppResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_toml_str(&content, path).map(Some)
    }

    fn from_toml_str(content: &str, path: &Path) -> AppResult<Self> {
        let config = toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(config)
    }

    /// 仅使用默认值与环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        Self {
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_timeout_secs: env_parse("LLM_TIMEOUT_SECS").unwrap_or(self.llm_timeout_secs),
            llm_max_attempts: env_parse("LLM_MAX_ATTEMPTS").unwrap_or(self.llm_max_attempts),
            llm_temperature: env_parse("LLM_TEMPERATURE").unwrap_or(self.llm_temperature),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS").unwrap_or(self.llm_max_tokens),
            exam_question_count: env_parse("EXAM_QUESTION_COUNT")
                .unwrap_or(self.exam_question_count),
            exam_duration_secs: env_parse("EXAM_DURATION_SECS").unwrap_or(self.exam_duration_secs),
            content_language: env_string("CONTENT_LANGUAGE").unwrap_or(self.content_language),
            data_dir: env_string("DATA_DIR").unwrap_or(self.data_dir),
            output_log_file: env_string("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            rust_log: env_string("RUST_LOG").unwrap_or(self.rust_log),
        }
    }

    /// 是否配置了 API 密钥
    pub fn has_llm_credentials(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
