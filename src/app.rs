//! 应用入口 - 编排层
//!
//! 解析命令行、执行一次评估、打印并保存报告。

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::models::AuditResult;
use crate::services::intake::BriefIntake;
use crate::services::report_writer::{render_text, ReportWriter};
use crate::utils::logging::log_startup;
use crate::workflow::{normalize_only, AuditFlow};

/// 命令行参数
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "integrity_audit",
    version,
    about = "Audit an assessment brief for AI integrity risk across ten rubric categories"
)]
pub struct CliArgs {
    /// Assessment brief to audit; `-` reads from stdin
    #[arg(value_name = "BRIEF_PATH", default_value = "-")]
    pub brief_path: PathBuf,

    /// Normalize a saved model response instead of calling the model
    #[arg(long = "raw", value_name = "RESPONSE_PATH")]
    pub raw_path: Option<PathBuf>,
}

/// 应用主结构
pub struct App {
    config: Config,
    writer: ReportWriter,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        log_startup(&config);
        let writer = ReportWriter::new(&config.output_dir);
        Self { config, writer }
    }

    /// 运行应用主逻辑
    pub async fn run(&self, args: &CliArgs) -> Result<AuditResult> {
        let outcome = match &args.raw_path {
            Some(raw_path) => self.normalize_saved(raw_path).await,
            None => self.audit(args).await,
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                error!("❌ 评估失败: {}", e);
                eprintln!("{}", e.user_message());
                return Err(e.into());
            }
        };

        println!("{}", render_text(&result));

        let written = self.writer.write(&result).await?;
        info!("✓ JSON: {}", written.json_path.display());
        info!("✓ Markdown: {}", written.markdown_path.display());

        Ok(result)
    }

    async fn audit(&self, args: &CliArgs) -> Result<AuditResult, AppError> {
        let flow = AuditFlow::new(&self.config)?;
        let brief = BriefIntake::new(&self.config).load(&args.brief_path).await?;
        flow.run_brief(&brief).await
    }

    async fn normalize_saved(&self, raw_path: &Path) -> Result<AuditResult, AppError> {
        info!("📂 规整已保存的模型响应: {}", raw_path.display());
        let raw = tokio::fs::read_to_string(raw_path)
            .await
            .map_err(|e| AppError::file(raw_path.display().to_string(), e))?;
        normalize_only(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("integrity_audit").chain(list.iter().copied()))
    }

    #[test]
    fn test_defaults_to_stdin() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.brief_path, PathBuf::from("-"));
        assert_eq!(parsed.raw_path, None);
    }

    #[test]
    fn test_brief_and_raw() {
        let parsed = args(&["brief.txt", "--raw", "response.txt"]).unwrap();
        assert_eq!(parsed.brief_path, PathBuf::from("brief.txt"));
        assert_eq!(parsed.raw_path, Some(PathBuf::from("response.txt")));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(args(&["--raw"]).is_err());
        assert!(args(&["--pdf"]).is_err());
        assert!(args(&["a.txt", "b.txt"]).is_err());
    }

    #[test]
    fn test_help_is_not_an_audit_failure() {
        let err = args(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
