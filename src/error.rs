//! 错误类型
//!
//! 每个关注点一个错误枚举，由 [`AppError`] 统一包装。

use thiserror::Error;

const NOT_CONFIGURED: &str = "The audit tool is not configured correctly.";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 模型响应规整错误
    #[error("响应规整错误: {0}")]
    Normalize(#[from] NormalizeError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 评估文本输入错误
    #[error("输入错误: {0}")]
    Intake(#[from] IntakeError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化错误
    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AppError {
    /// 创建文件错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }

    /// 面向最终用户的提示
    ///
    /// 区分"没有可评估的内容"、"服务响应无法解析"、"服务繁忙或不可用"和"配置错误"，
    /// 不暴露内部错误链。
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Normalize(NormalizeError::EmptyInput) | AppError::Intake(_) => {
                "No assessment content was found. Please provide the full assessment brief."
            }
            AppError::Normalize(NormalizeError::MalformedResponse { .. }) => {
                "The audit service response could not be parsed. Please try again or simplify the brief."
            }
            AppError::Llm(e) => e.user_message(),
            AppError::Config(_) => NOT_CONFIGURED,
            AppError::File { .. } | AppError::Serialize(_) => "The audit report could not be saved.",
        }
    }
}

/// 模型响应规整错误
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// 原始文本为空或只有空白
    #[error("模型响应为空")]
    EmptyInput,
    /// 修复一次后仍无法解析为 JSON 对象
    #[error("无法解析模型响应: {reason}")]
    MalformedResponse {
        reason: String,
        /// 原始文本，便于调试
        raw: String,
    },
}

impl NormalizeError {
    /// 原始模型响应（仅 `MalformedResponse` 携带）
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            NormalizeError::MalformedResponse { raw, .. } => Some(raw),
            NormalizeError::EmptyInput => None,
        }
    }
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 未配置 API 密钥
    #[error("未配置 LLM API 密钥")]
    MissingApiKey,
    /// 请求构建失败
    #[error("LLM 请求构建失败: {0}")]
    RequestBuild(String),
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 请求被服务拒绝（密钥无效、模型不存在、参数错误等），重试无意义
    #[error("LLM API拒绝请求 (模型: {model}): {message}")]
    Rejected { model: String, message: String },
    /// 请求频率限制或额度耗尽
    #[error("LLM API请求频率限制 (模型: {model}): {message}")]
    RateLimited { model: String, message: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 重试次数用尽
    #[error("LLM 调用在 {attempts} 次尝试后仍失败: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<LlmError>,
    },
}

impl LlmError {
    /// 面向最终用户的提示；重试用尽时按最后一次错误区分
    pub fn user_message(&self) -> &'static str {
        match self {
            LlmError::RateLimited { .. } => {
                "The audit service is busy right now. Please wait a minute and try again."
            }
            LlmError::MissingApiKey | LlmError::RequestBuild(_) | LlmError::Rejected { .. } => {
                NOT_CONFIGURED
            }
            LlmError::RetriesExhausted { last, .. } => last.user_message(),
            LlmError::ApiCallFailed { .. } | LlmError::EmptyContent { .. } => {
                "The audit service could not be reached. Please try again."
            }
        }
    }

    /// 是否为可重试的瞬时错误
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::ApiCallFailed { .. } | LlmError::RateLimited { .. }
        )
    }
}

/// 评估文本输入错误
#[derive(Debug, Error)]
pub enum IntakeError {
    /// 输入为空
    #[error("评估文本为空")]
    Empty,
    /// 输入过短
    #[error("评估文本过短: {actual} 个字符，至少需要 {min} 个")]
    TooShort { actual: usize, min: usize },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_distinguishes_empty_from_malformed() {
        let empty = AppError::from(NormalizeError::EmptyInput);
        let malformed = AppError::from(NormalizeError::MalformedResponse {
            reason: "no object".to_string(),
            raw: "hello".to_string(),
        });

        assert_ne!(empty.user_message(), malformed.user_message());
        assert!(empty.user_message().contains("No assessment content"));
        assert!(malformed.user_message().contains("could not be parsed"));
    }

    #[test]
    fn test_only_transport_and_rate_limit_are_transient() {
        let model = "m".to_string();
        assert!(LlmError::RateLimited {
            model: model.clone(),
            message: "429".to_string()
        }
        .is_transient());
        assert!(LlmError::ApiCallFailed {
            model: model.clone(),
            message: "reset".to_string()
        }
        .is_transient());
        assert!(!LlmError::EmptyContent { model }.is_transient());
        assert!(!LlmError::MissingApiKey.is_transient());
    }

    #[test]
    fn test_configuration_problems_are_not_reported_as_outages() {
        let missing_key = AppError::from(LlmError::MissingApiKey);
        let rejected = AppError::from(LlmError::Rejected {
            model: "m".to_string(),
            message: "invalid_api_key".to_string(),
        });

        assert!(missing_key.user_message().contains("not configured correctly"));
        assert!(rejected.user_message().contains("not configured correctly"));
        assert!(!LlmError::Rejected {
            model: "m".to_string(),
            message: "401".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_exhausted_retries_report_last_failure() {
        let busy = AppError::from(LlmError::RetriesExhausted {
            attempts: 3,
            last: Box::new(LlmError::RateLimited {
                model: "m".to_string(),
                message: "429".to_string(),
            }),
        });
        let unreachable = AppError::from(LlmError::RetriesExhausted {
            attempts: 3,
            last: Box::new(LlmError::ApiCallFailed {
                model: "m".to_string(),
                message: "connection reset".to_string(),
            }),
        });

        assert!(busy.user_message().contains("busy"));
        assert!(unreachable.user_message().contains("could not be reached"));
    }

    #[test]
    fn test_raw_response_exposed_for_malformed() {
        let err = NormalizeError::MalformedResponse {
            reason: "x".to_string(),
            raw: "plain prose".to_string(),
        };
        assert_eq!(err.raw_response(), Some("plain prose"));
        assert_eq!(NormalizeError::EmptyInput.raw_response(), None);
    }
}
