//! 响应规整 - 业务能力层
//!
//! 把模型返回的、不可信的文本转换为固定形状的 [`AuditResult`]。
//!
//! 处理顺序：
//! 1. 去掉 Markdown 代码块标记，截取第一个 `{` 到最后一个 `}`
//! 2. 解析 JSON；失败则做一次有限修复（去尾逗号、替换弯引号）后重试
//! 3. 统一两种结果形状：按维度名索引的对象 / 带 `category` 字段的数组
//! 4. 按规范顺序为每个维度取第一个匹配的记录，缺失则使用中性默认结论
//! 5. 提取并钳制分数，求和
//!
//! 纯函数：无 I/O、无共享状态，可在任意线程并发调用。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::NormalizeError;
use crate::models::{AuditResult, CategoryFinding, RubricCategory, Score};

/// 承载维度结果的顶层字段，按优先级排列
const RESULT_KEYS: [&str; 3] = ["audit_results", "results", "categories"];

/// 可能承载分数的字段，按优先级排列
const SCORE_FIELDS: [&str; 4] = ["score", "verified_score", "points", "rating"];

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*").expect("code fence pattern is valid"));

static TRAILING_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing separator pattern is valid"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit run pattern is valid"));

/// 某个维度未能从模型响应中得到完整数据
///
/// 非致命：对应维度已用中性默认值补齐。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGap {
    /// 没有任何记录匹配该维度
    Missing(RubricCategory),
    /// 找到了记录，但无法提取分数
    ScoreMissing(RubricCategory),
}

/// 规整结果及其中被补齐的维度
#[derive(Debug, Clone)]
pub struct Normalized {
    pub result: AuditResult,
    pub gaps: Vec<CategoryGap>,
}

/// 规整模型响应
pub fn normalize(raw: &str) -> Result<AuditResult, NormalizeError> {
    normalize_detailed(raw).map(|n| n.result)
}

/// 规整模型响应，并返回被默认值补齐的维度
pub fn normalize_detailed(raw: &str) -> Result<Normalized, NormalizeError> {
    if raw.trim().is_empty() {
        return Err(NormalizeError::EmptyInput);
    }

    let root = parse_object(raw)?;
    let records = collect_records(&root);
    debug!("模型响应中共有 {} 条维度记录", records.len());

    let mut gaps = Vec::new();
    let findings = RubricCategory::ALL.map(|category| {
        let (finding, gap) = resolve_category(category, &records);
        if let Some(gap) = gap {
            gaps.push(gap);
        }
        finding
    });

    if !gaps.is_empty() {
        warn!("{} 个维度使用了默认分数: {:?}", gaps.len(), gaps);
    }

    let result = AuditResult::new(context_label(&root), findings, improvements(&root));
    Ok(Normalized { result, gaps })
}

// ========== 解析与修复 ==========

/// 解析出顶层 JSON 对象，最多修复一次
fn parse_object(raw: &str) -> Result<Map<String, Value>, NormalizeError> {
    let unfenced = CODE_FENCE.replace_all(raw, "");
    let candidate = isolate_object(&unfenced).ok_or_else(|| malformed("响应中没有 JSON 对象", raw))?;

    let first_err = match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => return Ok(map),
        Ok(_) => return Err(malformed("顶层不是 JSON 对象", raw)),
        Err(e) => e,
    };

    warn!("首次解析失败 ({})，尝试修复后重试", first_err);
    let repaired = repair(candidate);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(malformed("顶层不是 JSON 对象", raw)),
        Err(e) => Err(malformed(&format!("修复后仍无法解析: {e}"), raw)),
    }
}

/// 截取第一个 `{` 到最后一个 `}` 之间的内容
fn isolate_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// 有限修复：弯引号定界符替换为直引号，再去掉闭合符号前的逗号
fn repair(candidate: &str) -> String {
    let straightened = straighten_quotes(candidate);
    TRAILING_SEPARATOR.replace_all(&straightened, "$1").into_owned()
}

fn is_smart_double(c: char) -> bool {
    matches!(c, '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}')
}

fn is_smart_single(c: char) -> bool {
    matches!(c, '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}')
}

/// 当前所在的字符串由哪种引号开启
#[derive(Clone, Copy, PartialEq, Eq)]
enum Quoting {
    Outside,
    Ascii,
    Smart,
}

/// 只替换充当定界符的弯引号
///
/// 直引号字符串内部的弯引号属于正文，原样保留；
/// 弯引号开启的字符串内部出现的直引号需要转义。
fn straighten_quotes(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut state = Quoting::Outside;
    let mut chars = candidate.chars();

    while let Some(c) = chars.next() {
        match state {
            Quoting::Outside => {
                if c == '"' {
                    state = Quoting::Ascii;
                    out.push(c);
                } else if is_smart_double(c) {
                    state = Quoting::Smart;
                    out.push('"');
                } else if is_smart_single(c) {
                    out.push('\'');
                } else {
                    out.push(c);
                }
            }
            Quoting::Ascii | Quoting::Smart if c == '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            Quoting::Ascii => {
                if c == '"' {
                    state = Quoting::Outside;
                }
                out.push(c);
            }
            Quoting::Smart => {
                if is_smart_double(c) {
                    state = Quoting::Outside;
                    out.push('"');
                } else if c == '"' {
                    out.push_str("\\\"");
                } else if is_smart_single(c) {
                    out.push('\'');
                } else {
                    out.push(c);
                }
            }
        }
    }
    out
}

fn malformed(reason: &str, raw: &str) -> NormalizeError {
    NormalizeError::MalformedResponse {
        reason: reason.to_string(),
        raw: raw.to_string(),
    }
}

// ========== 形状统一 ==========

/// 一条原始维度记录：模型声称的维度名 + 记录内容
#[derive(Debug)]
struct RawRecord<'a> {
    name: &'a str,
    /// 名称与标准名称完全一致时的维度
    exact: Option<RubricCategory>,
    body: &'a Value,
}

impl<'a> RawRecord<'a> {
    fn new(name: &'a str, body: &'a Value) -> Self {
        Self {
            name,
            exact: RubricCategory::from_label(name),
            body,
        }
    }

    fn refers_to(&self, category: RubricCategory) -> bool {
        self.exact == Some(category) || category.matches(self.name)
    }
}

/// 把数组形状和对象形状统一为记录序列，保持出现顺序
///
/// 对象形状依赖 `serde_json` 的 `preserve_order`，按键的出现顺序遍历。
fn collect_records(root: &Map<String, Value>) -> Vec<RawRecord<'_>> {
    let container = RESULT_KEYS.iter().find_map(|key| root.get(*key));

    match container {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| RawRecord::new(declared_category(item).unwrap_or(""), item))
            .collect(),
        Some(Value::Object(map)) => records_from_map(map),
        Some(_) => Vec::new(),
        // 没有容器字段时，顶层对象本身可能就是按维度名索引的
        None => records_from_map(root),
    }
}

fn records_from_map(map: &Map<String, Value>) -> Vec<RawRecord<'_>> {
    map.iter()
        .map(|(key, value)| RawRecord::new(declared_category(value).unwrap_or(key.as_str()), value))
        .collect()
}

fn declared_category(value: &Value) -> Option<&str> {
    value
        .get("category")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

// ========== 维度匹配 ==========

/// 为一个维度生成结论：取第一个匹配记录，不做最佳匹配打分
fn resolve_category(
    category: RubricCategory,
    records: &[RawRecord<'_>],
) -> (CategoryFinding, Option<CategoryGap>) {
    let Some(record) = records.iter().find(|r| r.refers_to(category)) else {
        return (
            CategoryFinding::placeholder(category),
            Some(CategoryGap::Missing(category)),
        );
    };

    let (score, gap) = match extract_score(record.body) {
        Some(raw) => (Score::clamped(raw), None),
        None => (Score::NEUTRAL, Some(CategoryGap::ScoreMissing(category))),
    };

    let finding = CategoryFinding {
        category,
        score,
        critique: text_field(record.body, "critique", CategoryFinding::NO_CRITIQUE),
        question: text_field(record.body, "question", CategoryFinding::NO_QUESTION),
        quote: text_field(record.body, "quote", CategoryFinding::QUOTE_NOT_FOUND),
    };
    (finding, gap)
}

/// 按字段优先级提取分数；第一个能得到数字的字段胜出
///
/// 记录本身是标量时（如 `{"Data recency": 4}`），直接从标量取分。
fn extract_score(body: &Value) -> Option<i64> {
    match body {
        Value::Object(fields) => SCORE_FIELDS
            .iter()
            .filter_map(|field| fields.get(*field))
            .find_map(coerce_number),
        scalar => coerce_number(scalar),
    }
}

/// 先直接转整数，再退回到扫描第一段数字
fn coerce_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().or_else(|| first_digit_run(s)),
        _ => None,
    }
}

fn first_digit_run(text: &str) -> Option<i64> {
    DIGIT_RUN
        .find(text)
        .map(|m| m.as_str().parse::<i64>().unwrap_or(i64::MAX))
}

fn text_field(body: &Value, key: &str, default: &str) -> String {
    let text = match body.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    };
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

// ========== 顶层字段 ==========

fn context_label(root: &Map<String, Value>) -> String {
    root.get("doc_context")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(AuditResult::DEFAULT_CONTEXT)
        .to_string()
}

fn improvements(root: &Map<String, Value>) -> Vec<String> {
    let items: Vec<String> = match root.get("top_improvements") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(AuditResult::MAX_IMPROVEMENTS)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    };

    if items.is_empty() {
        vec![AuditResult::DEFAULT_IMPROVEMENT.to_string()]
    } else {
        items
    }
}
