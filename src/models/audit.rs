//! 评估结果模型

use std::fmt;

use serde::Serialize;

use crate::models::category::RubricCategory;

/// 单个维度的分数，恒在 [1, 5] 内
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// 中性默认分：信息不足，既不算脆弱也不算稳健
    pub const NEUTRAL: Score = Score(3);

    /// 将任意整数饱和到 [1, 5]
    pub fn clamped(raw: i64) -> Self {
        Score(raw.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 单个维度的评估结论
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFinding {
    pub category: RubricCategory,
    pub score: Score,
    pub critique: String,
    pub question: String,
    pub quote: String,
}

impl CategoryFinding {
    pub const NO_CRITIQUE: &'static str = "No critique provided";
    pub const NO_QUESTION: &'static str = "No question provided";
    /// 未找到引文时的占位值
    pub const QUOTE_NOT_FOUND: &'static str = "N/A";
    pub const PLACEHOLDER_CRITIQUE: &'static str =
        "Insufficient information provided to evaluate this category.";
    pub const PLACEHOLDER_QUESTION: &'static str =
        "How could this category be better addressed in your assessment?";

    /// 模型响应中缺失该维度时使用的默认结论
    pub fn placeholder(category: RubricCategory) -> Self {
        Self {
            category,
            score: Score::NEUTRAL,
            critique: Self::PLACEHOLDER_CRITIQUE.to_string(),
            question: Self::PLACEHOLDER_QUESTION.to_string(),
            quote: Self::QUOTE_NOT_FOUND.to_string(),
        }
    }
}

/// 整体风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Susceptibility {
    #[serde(rename = "Low (Pedagogical Sovereignty)")]
    Low,
    #[serde(rename = "Medium (Structural Drift)")]
    Medium,
    #[serde(rename = "High (Critical Integrity Failure)")]
    High,
}

impl Susceptibility {
    pub fn from_total(total: u8) -> Self {
        if total >= 40 {
            Susceptibility::Low
        } else if total >= 25 {
            Susceptibility::Medium
        } else {
            Susceptibility::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Susceptibility::Low => "Low (Pedagogical Sovereignty)",
            Susceptibility::Medium => "Medium (Structural Drift)",
            Susceptibility::High => "High (Critical Integrity Failure)",
        }
    }

    /// 报告标题用的短名称
    pub fn position(self) -> &'static str {
        match self {
            Susceptibility::Low => "Resilient",
            Susceptibility::Medium => "Moderate",
            Susceptibility::High => "Vulnerable",
        }
    }
}

impl fmt::Display for Susceptibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 一次评估的完整结果
///
/// 恰好十条结论，按 [`RubricCategory::ALL`] 的顺序排列；
/// `total_score` 由构造函数计算，始终等于十个分数之和。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditResult {
    #[serde(rename = "doc_context")]
    context_label: String,
    top_improvements: Vec<String>,
    #[serde(rename = "audit_results")]
    findings: [CategoryFinding; 10],
    total_score: u8,
    susceptibility: Susceptibility,
}

impl AuditResult {
    pub const DEFAULT_CONTEXT: &'static str = "Assessment Audit";
    pub const DEFAULT_IMPROVEMENT: &'static str =
        "Review individual categories for specific improvements";
    pub const MAX_IMPROVEMENTS: usize = 3;

    /// 构造评估结果
    ///
    /// `findings` 会按规范顺序重排；改进建议最多保留三条。
    pub fn new(
        context_label: String,
        mut findings: [CategoryFinding; 10],
        mut top_improvements: Vec<String>,
    ) -> Self {
        findings.sort_by_key(|f| category_index(f.category));
        top_improvements.truncate(Self::MAX_IMPROVEMENTS);

        let total_score: u8 = findings.iter().map(|f| f.score.value()).sum();

        Self {
            context_label,
            top_improvements,
            findings,
            total_score,
            susceptibility: Susceptibility::from_total(total_score),
        }
    }

    pub fn context_label(&self) -> &str {
        &self.context_label
    }

    pub fn findings(&self) -> &[CategoryFinding; 10] {
        &self.findings
    }

    pub fn finding(&self, category: RubricCategory) -> &CategoryFinding {
        &self.findings[category_index(category)]
    }

    pub fn top_improvements(&self) -> &[String] {
        &self.top_improvements
    }

    pub fn total_score(&self) -> u8 {
        self.total_score
    }

    pub fn susceptibility(&self) -> Susceptibility {
        self.susceptibility
    }

    /// 得分最低的 `n` 个维度，同分时保持规范顺序
    pub fn weakest(&self, n: usize) -> Vec<&CategoryFinding> {
        let mut ranked: Vec<&CategoryFinding> = self.findings.iter().collect();
        ranked.sort_by_key(|f| f.score);
        ranked.truncate(n);
        ranked
    }

    /// 序列化为 JSON，重新规整后得到相同结果
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn category_index(category: RubricCategory) -> usize {
    RubricCategory::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap_or(RubricCategory::ALL.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_placeholders() -> [CategoryFinding; 10] {
        RubricCategory::ALL.map(CategoryFinding::placeholder)
    }

    #[test]
    fn test_score_clamps_both_ends() {
        assert_eq!(Score::clamped(-3).value(), 1);
        assert_eq!(Score::clamped(0).value(), 1);
        assert_eq!(Score::clamped(4).value(), 4);
        assert_eq!(Score::clamped(7).value(), 5);
        assert_eq!(Score::clamped(i64::MAX).value(), 5);
    }

    #[test]
    fn test_total_is_sum_of_findings() {
        let mut findings = all_placeholders();
        findings[0].score = Score::clamped(5);
        findings[9].score = Score::clamped(1);

        let result = AuditResult::new("ctx".to_string(), findings, vec![]);

        assert_eq!(result.total_score(), 3 * 8 + 5 + 1);
        assert_eq!(result.susceptibility(), Susceptibility::Medium);
    }

    #[test]
    fn test_new_restores_canonical_order() {
        let mut findings = all_placeholders();
        findings.reverse();

        let result = AuditResult::new("ctx".to_string(), findings, vec![]);

        let order: Vec<RubricCategory> = result.findings().iter().map(|f| f.category).collect();
        assert_eq!(order, RubricCategory::ALL.to_vec());
    }

    #[test]
    fn test_improvements_truncated_to_three() {
        let improvements = (1..=5).map(|i| format!("step {i}")).collect();
        let result = AuditResult::new("ctx".to_string(), all_placeholders(), improvements);
        assert_eq!(result.top_improvements().len(), 3);
        assert_eq!(result.top_improvements()[2], "step 3");
    }

    #[test]
    fn test_susceptibility_bands() {
        assert_eq!(Susceptibility::from_total(50), Susceptibility::Low);
        assert_eq!(Susceptibility::from_total(40), Susceptibility::Low);
        assert_eq!(Susceptibility::from_total(39), Susceptibility::Medium);
        assert_eq!(Susceptibility::from_total(25), Susceptibility::Medium);
        assert_eq!(Susceptibility::from_total(24), Susceptibility::High);
        assert_eq!(Susceptibility::from_total(10), Susceptibility::High);
    }

    #[test]
    fn test_weakest_keeps_canonical_order_on_ties() {
        let mut findings = all_placeholders();
        findings[4].score = Score::clamped(1);
        findings[7].score = Score::clamped(2);

        let result = AuditResult::new("ctx".to_string(), findings, vec![]);
        let weakest: Vec<RubricCategory> = result.weakest(3).iter().map(|f| f.category).collect();

        assert_eq!(
            weakest,
            vec![
                RubricCategory::TemporalFriction,
                RubricCategory::RealTimeDefence,
                RubricCategory::FinalProductWeighting,
            ]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let result = AuditResult::new("Essay brief".to_string(), all_placeholders(), vec![]);
        let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

        assert_eq!(value["doc_context"], "Essay brief");
        assert_eq!(value["total_score"], 30);
        assert_eq!(value["susceptibility"], "Medium (Structural Drift)");
        assert_eq!(value["audit_results"].as_array().unwrap().len(), 10);
        assert_eq!(value["audit_results"][0]["category"], "Final product weighting");
        assert_eq!(value["audit_results"][0]["score"], 3);
    }
}
