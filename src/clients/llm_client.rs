/// LLM API 客户端
///
/// 封装所有与 LLM API 相关的调用逻辑
///
/// ## 技术栈
/// - 使用 `async-openai` crate 进行 API 调用
/// - 支持自定义 API 端点和模型
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use super::{CompletionBackend, CompletionRequest, OutputShape};
use crate::config::Config;
use crate::error::LlmError;

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    /// 发送聊天请求
    ///
    /// # 参数
    /// - `request`: 生成请求；结构化请求的 Schema 会并入系统消息
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", request.prompt.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message_for(request) {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| LlmError::build_failed(&self.model_name, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(|e| LlmError::build_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::build_failed(&self.model_name, e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

impl CompletionBackend for LlmClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, LlmError>> {
        self.send_to_llm(request).boxed()
    }
}

/// 合并系统消息与输出约束
///
/// 兼容 OpenAI API 的代理服务对 `response_format` 支持不一，
/// 因此 Schema 以文字形式放进系统消息，返回结果由网关严格校验。
fn system_message_for(request: &CompletionRequest) -> Option<String> {
    match (&request.output, &request.system_message) {
        (OutputShape::Text, sys) => sys.clone(),
        (OutputShape::Json(schema), sys) => {
            let schema_text = serde_json::to_string_pretty(schema).unwrap_or_default();
            let constraint = format!(
                "只输出一个符合以下 JSON Schema 的 JSON 值，\
                 不要输出任何其他内容，不要使用代码块：\n{}",
                schema_text
            );
            Some(match sys {
                Some(sys) => format!("{}\n\n{}", sys, constraint),
                None => constraint,
            })
        }
    }
}

/// 离线后端：未配置 API 密钥时使用
pub struct OfflineBackend;

impl CompletionBackend for OfflineBackend {
    fn model_name(&self) -> &str {
        "offline"
    }

    fn complete<'a>(
        &'a self,
        _request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, LlmError>> {
        async { Err(LlmError::NotConfigured) }.boxed()
    }
}
