use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "audit.toml";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 采样温度，越低输出越稳定
    pub llm_temperature: f32,
    /// 单次请求的最大尝试次数（含首次）
    pub max_attempts: u32,
    /// 两次尝试之间的固定等待时间（毫秒）
    pub retry_delay_ms: u64,
    // --- 输入限制 ---
    /// 评估文本最少字符数
    pub min_brief_chars: usize,
    /// 发送给模型前截断到的字符数
    pub max_brief_chars: usize,
    // --- 输出 ---
    /// 报告输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-1.5-flash".to_string(),
            llm_temperature: 0.1,
            max_attempts: 3,
            retry_delay_ms: 2000,
            min_brief_chars: 100,
            max_brief_chars: 8000,
            output_dir: "audit_reports".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 配置文件（可选）→ 环境变量
    ///
    /// 配置文件路径取自 `AUDIT_CONFIG`，未设置时使用当前目录下的 `audit.toml`（存在才读取）。
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("AUDIT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            debug!("未找到配置文件 {}，使用默认配置", path);
            Self::default()
        };
        base.overlay_env(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取配置，缺失字段使用默认值
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 抽象了环境变量读取，便于测试。
    pub fn overlay_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LLM_API_KEY") {
            self.llm_api_key = v;
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = lookup("OUTPUT_DIR") {
            self.output_dir = v;
        }
        parse_env(&lookup, "LLM_TEMPERATURE", "f32", &mut self.llm_temperature)?;
        parse_env(&lookup, "MAX_ATTEMPTS", "u32", &mut self.max_attempts)?;
        parse_env(&lookup, "RETRY_DELAY_MS", "u64", &mut self.retry_delay_ms)?;
        parse_env(&lookup, "MIN_BRIEF_CHARS", "usize", &mut self.min_brief_chars)?;
        parse_env(&lookup, "MAX_BRIEF_CHARS", "usize", &mut self.max_brief_chars)?;
        parse_env(&lookup, "VERBOSE_LOGGING", "bool", &mut self.verbose_logging)?;
        Ok(self)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn parse_env<F, T>(
    lookup: &F,
    var_name: &str,
    expected_type: &'static str,
    slot: &mut T,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(var_name) {
        *slot = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_toml_overrides_only_given_fields() {
        let config = Config::from_toml_str(
            r#"
llm_model_name = "gemini-2.0-flash"
max_attempts = 5
"#,
        )
        .unwrap();

        assert_eq!(config.llm_model_name, "gemini-2.0-flash");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.max_brief_chars, 8000);
        assert_eq!(config.min_brief_chars, 100);
    }

    #[test]
    fn test_env_overrides_toml() {
        let config = Config::from_toml_str("max_attempts = 5")
            .unwrap()
            .overlay_env(env(&[("MAX_ATTEMPTS", "2"), ("LLM_API_KEY", "k")]))
            .unwrap();

        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.llm_api_key, "k");
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let err = Config::default()
            .overlay_env(env(&[("RETRY_DELAY_MS", "soon")]))
            .unwrap_err();

        match err {
            ConfigError::EnvVarParseFailed {
                var_name, value, ..
            } => {
                assert_eq!(var_name, "RETRY_DELAY_MS");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
