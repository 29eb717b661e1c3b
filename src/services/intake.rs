//! 评估文本输入 - 业务能力层
//!
//! 读取评估说明文本，检查长度并截断到模型提示词的字符预算内。

use std::path::Path;

use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, IntakeError};

/// 经过校验、可直接放入提示词的评估文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brief {
    text: String,
    /// 截断前的字符数
    original_chars: usize,
}

impl Brief {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn original_chars(&self) -> usize {
        self.original_chars
    }

    pub fn was_truncated(&self) -> bool {
        self.text.chars().count() < self.original_chars
    }
}

/// 评估文本校验器
pub struct BriefIntake {
    min_chars: usize,
    max_chars: usize,
}

impl BriefIntake {
    pub fn new(config: &Config) -> Self {
        Self {
            min_chars: config.min_brief_chars,
            max_chars: config.max_brief_chars,
        }
    }

    /// 校验并截断文本
    pub fn prepare(&self, raw: &str) -> Result<Brief, IntakeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IntakeError::Empty);
        }

        let original_chars = trimmed.chars().count();
        if original_chars < self.min_chars {
            return Err(IntakeError::TooShort {
                actual: original_chars,
                min: self.min_chars,
            });
        }

        let text = truncate_chars(trimmed, self.max_chars).to_string();
        if original_chars > self.max_chars {
            info!(
                "✂️ 评估文本共 {} 个字符，截断为前 {} 个",
                original_chars, self.max_chars
            );
        }

        Ok(Brief {
            text,
            original_chars,
        })
    }

    /// 从文件读取评估文本；路径为 `-` 时读取标准输入
    pub async fn load(&self, path: &Path) -> AppResult<Brief> {
        let raw = if path.as_os_str() == "-" {
            read_stdin().await?
        } else {
            debug!("读取评估文本: {}", path.display());
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| AppError::file(path.display().to_string(), e))?
        };
        Ok(self.prepare(&raw)?)
    }
}

async fn read_stdin() -> AppResult<String> {
    debug!("从标准输入读取评估文本");
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .map_err(|e| AppError::file("<stdin>", e))?;
    Ok(buf)
}

/// 按字符边界截断
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake(min: usize, max: usize) -> BriefIntake {
        BriefIntake {
            min_chars: min,
            max_chars: max,
        }
    }

    #[test]
    fn test_blank_is_empty() {
        assert!(matches!(intake(1, 10).prepare(" \n "), Err(IntakeError::Empty)));
    }

    #[test]
    fn test_too_short_reports_counts() {
        match intake(100, 8000).prepare("Write an essay.") {
            Err(IntakeError::TooShort { actual, min }) => {
                assert_eq!(actual, 15);
                assert_eq!(min, 100);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let brief = intake(1, 3).prepare("défense").unwrap();
        assert_eq!(brief.text(), "déf");
        assert_eq!(brief.original_chars(), 7);
        assert!(brief.was_truncated());
    }

    #[test]
    fn test_short_enough_is_untouched() {
        let brief = intake(1, 100).prepare("  Portfolio brief  ").unwrap();
        assert_eq!(brief.text(), "Portfolio brief");
        assert!(!brief.was_truncated());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("integrity_audit_intake_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("brief.txt");
        std::fs::write(&path, "A reflective portfolio submitted in week 13.").unwrap();

        let brief = tokio_test::block_on(intake(10, 8000).load(&path)).unwrap();
        assert_eq!(brief.text(), "A reflective portfolio submitted in week 13.");

        let missing = tokio_test::block_on(intake(10, 8000).load(&dir.join("nope.txt")));
        assert!(matches!(missing, Err(AppError::File { .. })));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
