//! 评估提示词

use crate::models::RubricCategory;

/// 系统消息
pub const SYSTEM_MESSAGE: &str = "You are an experienced Higher Education assessment designer conducting an Integrity Debt Audit. \
You judge how easily an assessment brief could be completed by generative AI without genuine learning, \
and you always answer with a single valid JSON object.";

/// 构建评估用户消息
///
/// 维度按规范顺序列出，文本应已由 [`crate::services::intake`] 截断。
pub fn build_audit_prompt(brief: &str) -> String {
    let category_info = RubricCategory::ALL
        .iter()
        .map(|c| format!("- {}: {}", c.label(), c.description()))
        .collect::<Vec<_>>()
        .join("\n");

    let first = RubricCategory::ALL[0].label();

    format!(
        r#"Audit the following Higher Education assessment brief.

CRITICAL INSTRUCTIONS:
1. Analyse the assessment brief against EXACTLY these 10 categories in this exact order:
{category_info}

2. For each category, provide:
   - A score from 1-5 (where 1 = easily automated/vulnerable, 5 = resilient)
   - A critique explaining why you gave this score (keep under 150 words)
   - A dialogue question to help the educator reflect (one sentence)
   - A direct quote from the assessment that supports your score (under 50 words)

3. Your response MUST be valid JSON with this exact structure:
{{
    "doc_context": "Brief title/description of the assessment",
    "top_improvements": ["Improvement 1", "Improvement 2", "Improvement 3"],
    "audit_results": [
        {{
            "category": "{first}",
            "score": 3,
            "critique": "Your analysis here",
            "question": "Reflective question here",
            "quote": "Direct quote from assessment"
        }}
    ]
}}
   Repeat the audit_results entry for all 10 categories in order.

4. JSON FORMATTING RULES:
   - NO trailing commas before closing braces or brackets
   - Escape ALL quotes within strings using backslash: \"
   - Keep critique and quote fields SHORT
   - Do NOT include line breaks within string values
   - Use only standard ASCII quotes, not smart quotes

5. IMPORTANT:
   - Use ONLY the category names listed above
   - Provide exactly 10 results, one for each category
   - Scores must be integers from 1-5
   - Use British English spellings (organise, emphasise, analyse)
   - If information is missing for a category, estimate based on typical practice and say so in the critique

Assessment text to analyse:
{brief}

Return ONLY valid JSON with no additional text, markdown formatting, or preamble."#
    )
}
