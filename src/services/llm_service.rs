//! LLM 服务 - 业务能力层
//!
//! 只负责"向模型要一份评估"的能力，不解析结果
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点）

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::services::prompt::{build_audit_prompt, SYSTEM_MESSAGE};
use crate::utils::retry::{with_retry, RetryPolicy};

/// 单次评估允许的最大输出 token 数
const MAX_COMPLETION_TOKENS: u32 = 4096;

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 生成评估 JSON
/// - 对频率限制和网络错误做有限次数重试
/// - 不解析、不修复模型输出
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    retry: RetryPolicy,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        if config.llm_api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            retry: RetryPolicy::new(config.max_attempts, config.retry_delay()),
        })
    }

    /// 请求一份评估，返回模型的原始文本
    ///
    /// `brief` 应已截断到字符预算内。
    pub async fn request_audit(&self, brief: &str) -> Result<String, LlmError> {
        let prompt = build_audit_prompt(brief);
        info!("🤖 正在请求模型评估 (模型: {})", self.model_name);

        let prompt = prompt.as_str();
        with_retry(self.retry, move |attempt| {
            debug!("第 {} 次请求", attempt);
            self.send_to_llm(prompt, Some(SYSTEM_MESSAGE))
        })
        .await
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回第一个候选的文本内容（去掉首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| LlmError::RequestBuild(e.to_string()))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| LlmError::RequestBuild(e.to_string()))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(MAX_COMPLETION_TOKENS)
            .build()
            .map_err(|e| LlmError::RequestBuild(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            classify_failure(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content)
    }
}

/// 频率限制 / 额度耗尽的标记
const RATE_LIMIT_MARKERS: [&str; 6] = [
    "429",
    "rate limit",
    "rate_limit",
    "resource_exhausted",
    "quota",
    "too many requests",
];

/// 服务端临时故障的错误类型
const SERVER_ERROR_TYPES: [&str; 3] = ["server_error", "api_error", "internal"];

fn mentions_rate_limit(text: &str) -> bool {
    let lower = text.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}

/// 按错误种类区分：频率限制、可重试的传输 / 服务端故障、不可重试的请求被拒
fn classify_failure(model: &str, error: OpenAIError) -> LlmError {
    let model = model.to_string();
    let message = error.to_string();

    match &error {
        OpenAIError::ApiError(api) => {
            let kind = [api.r#type.as_deref(), api.code.as_deref()];
            if mentions_rate_limit(&message) {
                LlmError::RateLimited { model, message }
            } else if kind.iter().all(Option::is_none)
                || kind
                    .iter()
                    .flatten()
                    .any(|k| SERVER_ERROR_TYPES.contains(&k.to_lowercase().as_str()))
            {
                // 5xx 响应不保证是 JSON，类型与代码都为空
                LlmError::ApiCallFailed { model, message }
            } else {
                LlmError::Rejected { model, message }
            }
        }
        OpenAIError::JSONDeserialize(_, content) if mentions_rate_limit(content) => {
            LlmError::RateLimited { model, message }
        }
        OpenAIError::Reqwest(_) | OpenAIError::StreamError(_) => {
            LlmError::ApiCallFailed { model, message }
        }
        _ => LlmError::Rejected { model, message },
    }
}
