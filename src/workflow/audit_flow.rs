//! 评估流程 - 流程层
//!
//! 核心职责：定义"一次评估"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验并截断评估文本
//! 2. 请求模型（有限重试）
//! 3. 规整模型响应 → `AuditResult`

use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::AuditResult;
use crate::services::intake::{Brief, BriefIntake};
use crate::services::normalizer::{self, Normalized};
use crate::services::LlmService;
use crate::utils::logging::truncate_text;

/// 评估流程
///
/// - 每次调用相互独立，不保存任何评估状态
/// - 不持有输出资源，写报告由调用方决定
pub struct AuditFlow {
    intake: BriefIntake,
    llm_service: LlmService,
}

impl AuditFlow {
    /// 创建新的评估流程
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self {
            intake: BriefIntake::new(config),
            llm_service: LlmService::new(config)?,
        })
    }

    /// 对原始评估文本执行完整评估
    pub async fn run(&self, raw_brief: &str) -> AppResult<AuditResult> {
        let brief = self.intake.prepare(raw_brief)?;
        self.run_brief(&brief).await
    }

    /// 对已校验的评估文本执行完整评估
    pub async fn run_brief(&self, brief: &Brief) -> AppResult<AuditResult> {
        info!(
            "📄 评估文本 {} 个字符{}",
            brief.original_chars(),
            if brief.was_truncated() { "（已截断）" } else { "" }
        );

        let raw = self.llm_service.request_audit(brief.text()).await?;
        info!("✓ 收到模型响应，{} 个字符", raw.len());

        let result = normalize_only(&raw)?;
        info!(
            "✓ 评估完成: {} 分 / 50 ({})",
            result.total_score(),
            result.susceptibility()
        );
        Ok(result)
    }
}

/// 只做规整：处理已保存的模型响应，不调用模型
pub fn normalize_only(raw: &str) -> AppResult<AuditResult> {
    match normalizer::normalize_detailed(raw) {
        Ok(Normalized { result, gaps }) => {
            if !gaps.is_empty() {
                info!("{} 个维度使用默认结论", gaps.len());
            }
            Ok(result)
        }
        Err(e) => {
            warn!(
                "❌ 模型响应无法规整: {} | 响应预览: {}",
                e,
                truncate_text(raw, 200)
            );
            Err(e.into())
        }
    }
}
