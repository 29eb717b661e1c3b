//! 报告输出 - 业务能力层
//!
//! 只负责把 [`AuditResult`] 渲染成文本 / Markdown / JSON，并写入输出目录

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{AuditResult, CategoryFinding};

/// 报告中展开说明的最弱维度数量
const FOCUS_AREAS: usize = 3;

/// 终端摘要
pub fn render_text(result: &AuditResult) -> String {
    let rule = "=".repeat(60);
    let thin = "─".repeat(60);

    let mut out = format!(
        "{rule}\nIntegrity Debt Audit: {}\nTotal score: {}/50  ({} position, {} susceptibility)\n{rule}\n",
        result.context_label(),
        result.total_score(),
        result.susceptibility().position(),
        result.susceptibility()
    );

    for (idx, finding) in result.findings().iter().enumerate() {
        out.push_str(&format!(
            "\n{:>2}. {} [{}/5] {}\n    Critique: {}\n    Question: {}\n    Evidence: {}\n",
            idx + 1,
            finding.category,
            finding.score,
            score_bar(finding),
            finding.critique,
            finding.question,
            finding.quote
        ));
    }

    out.push_str(&format!("\n{thin}\nTop improvements:\n"));
    for (idx, item) in result.top_improvements().iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", idx + 1, item));
    }

    out.push_str(&format!("\n{thin}\nFocus areas:\n"));
    for finding in result.weakest(FOCUS_AREAS) {
        out.push_str(&format!(
            "\n* {} ({}/5)\n  {}\n",
            finding.category,
            finding.score,
            finding.category.pedagogical_context()
        ));
        for action in finding.category.improvement_actions() {
            out.push_str(&format!("  - {action}\n"));
        }
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

/// Markdown 报告
pub fn render_markdown(result: &AuditResult) -> String {
    let mut out = format!(
        "# Integrity Debt Audit: {}\n\n**Total score:** {}/50  \n**Susceptibility:** {}\n\n",
        result.context_label(),
        result.total_score(),
        result.susceptibility()
    );

    out.push_str("| # | Category | Score |\n|---|----------|-------|\n");
    for (idx, finding) in result.findings().iter().enumerate() {
        out.push_str(&format!("| {} | {} | {}/5 |\n", idx + 1, finding.category, finding.score));
    }

    out.push_str("\n## Findings\n");
    for finding in result.findings() {
        out.push_str(&format!(
            "\n### {} ({}/5)\n\n{}\n\n*Reflective question:* {}\n\n> {}\n",
            finding.category, finding.score, finding.critique, finding.question, finding.quote
        ));
    }

    out.push_str("\n## Top improvements\n\n");
    for (idx, item) in result.top_improvements().iter().enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, item));
    }

    out.push_str("\n## Focus areas\n");
    for finding in result.weakest(FOCUS_AREAS) {
        out.push_str(&format!(
            "\n### {}\n\n{}\n\n",
            finding.category,
            finding.category.pedagogical_context()
        ));
        for action in finding.category.improvement_actions() {
            out.push_str(&format!("- {action}\n"));
        }
    }
    out
}

fn score_bar(finding: &CategoryFinding) -> String {
    let filled = finding.score.value() as usize;
    format!("{}{}", "■".repeat(filled), "□".repeat(5 - filled))
}

/// 报告写入服务
///
/// 每次写入生成一对带时间戳的文件：`audit_<时间>.json` 和 `audit_<时间>.md`
pub struct ReportWriter {
    output_dir: PathBuf,
}

/// 已写入的报告文件
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 写入 JSON 和 Markdown 报告
    pub async fn write(&self, result: &AuditResult) -> AppResult<WrittenReport> {
        let stem = format!("audit_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
        self.write_with_stem(result, &stem).await
    }

    pub async fn write_with_stem(&self, result: &AuditResult, stem: &str) -> AppResult<WrittenReport> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::file(self.output_dir.display().to_string(), e))?;

        let json_path = self.output_dir.join(format!("{stem}.json"));
        let markdown_path = self.output_dir.join(format!("{stem}.md"));

        write_file(&json_path, result.to_json()?).await?;
        write_file(&markdown_path, render_markdown(result)).await?;

        info!("📝 报告已保存至: {}", self.output_dir.display());
        Ok(WrittenReport {
            json_path,
            markdown_path,
        })
    }
}

async fn write_file(path: &Path, content: String) -> AppResult<()> {
    debug!("写入文件: {} ({} 字节)", path.display(), content.len());
    tokio::fs::write(path, content)
        .await
        .map_err(|e| AppError::file(path.display().to_string(), e))
}
