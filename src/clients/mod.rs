//! 外部生成能力的客户端
//!
//! 生成网关只依赖 [`CompletionBackend`]，具体实现可以替换：
//! - `LlmClient`：兼容 OpenAI API 的服务（OpenAI, Gemini, Doubao 等）
//! - `OfflineBackend`：未配置密钥时使用，所有调用直接失败并走兜底

pub mod llm_client;

pub use llm_client::{LlmClient, OfflineBackend};

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::LlmError;

/// 期望的输出形式
#[derive(Debug, Clone, PartialEq)]
pub enum OutputShape {
    /// 自由文本
    Text,
    /// 符合给定 JSON Schema 的结构化数据
    Json(Value),
}

/// 一次生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_message: Option<String>,
    pub prompt: String,
    pub output: OutputShape,
}

impl CompletionRequest {
    /// 自由文本请求
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            system_message: None,
            prompt: prompt.into(),
            output: OutputShape::Text,
        }
    }

    /// 结构化 JSON 请求
    pub fn json(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            system_message: None,
            prompt: prompt.into(),
            output: OutputShape::Json(schema),
        }
    }

    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }
}

/// 文本生成能力
///
/// 提交一条指令，返回文本（或 JSON 文本），可能失败。
pub trait CompletionBackend: Send + Sync {
    /// 模型名称（仅用于日志）
    fn model_name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, LlmError>>;
}
