//! 生成网关 - 业务能力层
//!
//! 负责"出题"和"生成学习资料"两种能力：构建提示词、调用 LLM、
//! 严格解析返回结果，任何失败都替换为固定兜底数据。
//!
//! 对外约定：两个操作都不会返回错误，也不会返回空结果。

use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::{CompletionBackend, CompletionRequest, LlmClient, OfflineBackend};
use crate::config::Config;
use crate::error::LlmError;
use crate::models::{Question, QuestionKind, StudyTopic};
use crate::services::fallback::{
    fallback_questions, STUDY_MATERIAL_EMPTY, STUDY_MATERIAL_FAILED,
};
use crate::services::prompts::{
    build_exam_prompt, build_study_prompt, exam_schema, EXAM_SYSTEM_MESSAGE,
    STUDY_SYSTEM_MESSAGE,
};

/// 出题结果的解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// 解析成功（至少一道题）
    Parsed(Vec<Question>),
    /// 不符合题目格式，附原因
    Malformed(String),
}

/// LLM 返回的单道题（尚未分配 ID）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    content: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    correct_answer: bool,
    explanation: String,
}

/// 生成网关
///
/// 职责：
/// - 构建出题 / 讲解提示词
/// - 调用 LLM（可选超时与有限次重试）
/// - 校验结构化返回
/// - 失败时返回兜底数据，不向上抛错
pub struct GenerationGateway {
    backend: Arc<dyn CompletionBackend>,
    timeout: Option<Duration>,
    max_attempts: u32,
    language: String,
}

impl GenerationGateway {
    /// 使用指定的后端创建网关
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &Config) -> Self {
        let timeout =
            (config.llm_timeout_secs > 0).then(|| Duration::from_secs(config.llm_timeout_secs));

        Self {
            backend,
            timeout,
            max_attempts: config.llm_max_attempts.max(1),
            language: config.content_language.clone(),
        }
    }

    /// 根据配置选择后端：有密钥时使用 LLM 客户端，否则离线
    pub fn from_config(config: &Config) -> Self {
        let backend: Arc<dyn CompletionBackend> = if config.has_llm_credentials() {
            Arc::new(LlmClient::new(config))
        } else {
            warn!("⚠️ 未配置 LLM_API_KEY，将使用离线兜底内容");
            Arc::new(OfflineBackend)
        };

        Self::new(backend, config)
    }

    /// 生成考试判断题
    ///
    /// # 参数
    /// - `count`: 请求的题目数量
    ///
    /// # 返回
    /// 解析成功时返回 LLM 出的题（多于 `count` 时截断）；
    /// 任何失败返回固定的两道兜底题
    pub async fn generate_exam_questions(&self, count: usize) -> Vec<Question> {
        if count == 0 {
            warn!("请求的题目数量为 0，使用兜底题目");
            return fallback_questions();
        }

        info!("🤖 正在生成 {} 道考题...", count);

        let prompt = build_exam_prompt(count, &self.language);
        let request =
            CompletionRequest::json(prompt, exam_schema()).with_system_message(EXAM_SYSTEM_MESSAGE);

        let payload = match self.request(&request).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("生成考题失败，使用兜底题目: {}", e);
                return fallback_questions();
            }
        };

        match parse_exam_payload(&payload, count, Utc::now().timestamp_millis()) {
            ParseOutcome::Parsed(questions) => {
                info!("✓ 成功生成 {} 道考题", questions.len());
                questions
            }
            ParseOutcome::Malformed(reason) => {
                warn!("考题格式不正确，使用兜底题目: {}", reason);
                fallback_questions()
            }
        }
    }

    /// 生成学习资料
    ///
    /// 返回 LLM 的原文；返回为空或调用失败时返回固定提示文字
    pub async fn generate_study_material(&self, topic: &StudyTopic) -> String {
        info!("📖 正在生成学习资料: {}", topic.title);

        let request = CompletionRequest::text(build_study_prompt(topic, &self.language))
            .with_system_message(STUDY_SYSTEM_MESSAGE);

        match self.request(&request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) | Err(LlmError::EmptyContent { .. }) => {
                warn!("学习资料为空: {}", topic.title);
                STUDY_MATERIAL_EMPTY.to_string()
            }
            Err(e) => {
                warn!("生成学习资料失败: {}", e);
                STUDY_MATERIAL_FAILED.to_string()
            }
        }
    }

    /// 发送请求，按配置重试
    async fn request(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match self.attempt(request).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("LLM 调用失败 (第 {}/{} 次): {}", attempt, self.max_attempts, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(LlmError::EmptyContent {
            model: self.backend.model_name().to_string(),
        }))
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        debug!("调用生成后端，模型: {}", self.backend.model_name());

        let call = self.backend.complete(request);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| LlmError::Timeout {
                    model: self.backend.model_name().to_string(),
                    secs: limit.as_secs(),
                })?,
            None => call.await,
        }
    }
}

/// 严格解析出题结果
///
/// # 参数
/// - `payload`: LLM 返回的文本（允许包在 Markdown 代码块中）
/// - `requested`: 请求的题目数量，多出的部分截断
/// - `batch_stamp`: 本批题目的时间戳，用于生成 ID
pub fn parse_exam_payload(payload: &str, requested: usize, batch_stamp: i64) -> ParseOutcome {
    let json_text = strip_code_fence(payload);

    let mut raw: Vec<RawQuestion> = match serde_json::from_str(json_text) {
        Ok(raw) => raw,
        Err(e) => return ParseOutcome::Malformed(format!("JSON 不符合题目格式: {}", e)),
    };

    if raw.is_empty() {
        return ParseOutcome::Malformed("题目列表为空".to_string());
    }

    if let Some(index) = raw
        .iter()
        .position(|q| q.content.trim().is_empty() || q.explanation.trim().is_empty())
    {
        return ParseOutcome::Malformed(format!("第 {} 道题缺少题干或解析", index + 1));
    }

    if raw.len() > requested {
        debug!("LLM 返回 {} 道题，截断为 {} 道", raw.len(), requested);
        raw.truncate(requested);
    } else if raw.len() < requested {
        debug!("LLM 只返回了 {} 道题（请求 {} 道）", raw.len(), requested);
    }

    let questions = raw
        .into_iter()
        .enumerate()
        .map(|(index, item)| Question {
            id: format!("q-{}-{}", batch_stamp, index),
            media_hint: (item.kind == QuestionKind::Video).then(|| media_hint_url(index)),
            kind: item.kind,
            content: item.content,
            correct_answer: item.correct_answer,
            explanation: item.explanation,
        })
        .collect();

    ParseOutcome::Parsed(questions)
}

/// 视频情境题的示意图
fn media_hint_url(index: usize) -> String {
    format!("https://picsum.photos/800/450?random={}", index)
}

/// 去掉包裹 JSON 的 Markdown 代码块
fn strip_code_fence(payload: &str) -> &str {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").ok());

    fence
        .as_ref()
        .and_then(|re| re.captures(payload))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or_else(|| payload.trim())
}
