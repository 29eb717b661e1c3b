use integrity_audit::services::{normalize_detailed, render_text, CategoryGap, ReportWriter};
use integrity_audit::workflow::normalize_only;
use integrity_audit::{normalize, AppError, NormalizeError, RubricCategory};
use serde_json::{json, Value};

/// 典型的模型响应：带前言、代码块、尾逗号，维度顺序打乱
fn messy_response() -> String {
    r#"Sure! Here is the audit you asked for:

```json
{
  "doc_context": "BSV07101 Architectural Technology 1 - 100% portfolio",
  "top_improvements": [
    "Add a short viva on the design rationale",
    "Grade a week 6 process log",
    "Ask for hand-drawn concept sketches",
    "This fourth item should be dropped",
  ],
  "audit_results": [
    {"category": "Data recency", "score": 2, "critique": "Static design principles.", "question": "Could a recent planning decision be used?", "quote": "iconic houses"},
    {"category": "Final Product Weighting", "score": "1", "critique": "Single portfolio worth 100%.", "question": "Can marks be staged?", "quote": "Portfolio 100"},
    {"category": "Iterative documentation", "score": "3 - some drafts", "critique": "Drawings evolve over the trimester."},
    {"category": "Contextual specificity", "rating": 4, "critique": "Client brief is specific."},
    {"category": "Reflective criticality", "score": 2},
    {"category": "Temporal friction", "score": 4.0},
    {"category": "Multimodal evidence", "score": 5, "quote": "architectural software"},
    {"category": "Explicit AI interrogation", "score": 1},
    {"category": "Real-time defence", "score": 9},
    {"category": "Social and collaborative labour", "score": 4, "quote": "collaborative group work"},
  ]
}
```
Let me know if you need anything else."#
        .to_string()
}

#[test]
fn test_messy_response_normalizes_in_canonical_order() {
    let result = normalize(&messy_response()).expect("响应应能规整");

    let order: Vec<RubricCategory> = result.findings().iter().map(|f| f.category).collect();
    assert_eq!(order, RubricCategory::ALL.to_vec());

    let scores: Vec<u8> = result.findings().iter().map(|f| f.score.value()).collect();
    assert_eq!(scores, vec![1, 3, 4, 2, 4, 5, 1, 5, 4, 2]);
    assert_eq!(result.total_score(), 31);
    assert_eq!(result.top_improvements().len(), 3);
    assert_eq!(
        result.context_label(),
        "BSV07101 Architectural Technology 1 - 100% portfolio"
    );
}

#[test]
fn test_total_score_always_in_range() {
    let lows = json!({
        "audit_results": RubricCategory::ALL.iter()
            .map(|c| json!({"category": c.label(), "score": -10}))
            .collect::<Vec<_>>()
    });
    let highs = json!({
        "audit_results": RubricCategory::ALL.iter()
            .map(|c| json!({"category": c.label(), "score": "100 out of 5"}))
            .collect::<Vec<_>>()
    });

    assert_eq!(normalize(&lows.to_string()).unwrap().total_score(), 10);
    assert_eq!(normalize(&highs.to_string()).unwrap().total_score(), 50);
}

#[test]
fn test_serialized_result_renormalizes_identically() {
    let first = normalize(&messy_response()).unwrap();
    let serialized = first.to_json().unwrap();

    let second = normalize(&serialized).unwrap();
    assert_eq!(first, second);

    let third = normalize(&second.to_json().unwrap()).unwrap();
    assert_eq!(second, third);
}

#[test]
fn test_example_scenario_with_eight_missing_categories() {
    let raw = r#"{"audit_results":[{"category":"Data recency","score":"2"},{"category":"Temporal friction","score":5}], "doc_context": "Essay"}"#;
    let normalized = normalize_detailed(raw).unwrap();
    let result = &normalized.result;

    assert_eq!(result.finding(RubricCategory::DataRecency).score.value(), 2);
    assert_eq!(result.finding(RubricCategory::TemporalFriction).score.value(), 5);
    for category in RubricCategory::ALL {
        if category != RubricCategory::DataRecency && category != RubricCategory::TemporalFriction {
            assert_eq!(result.finding(category).score.value(), 3);
            assert!(normalized.gaps.contains(&CategoryGap::Missing(category)));
        }
    }
    assert_eq!(result.total_score(), 31);
    assert_eq!(normalized.gaps.len(), 8);
}

#[test]
fn test_list_and_mapping_shapes_agree() {
    let list: Value = json!({
        "doc_context": "Lab report",
        "audit_results": RubricCategory::ALL.iter().enumerate()
            .map(|(i, c)| json!({"category": c.label(), "score": (i % 5) + 1, "critique": format!("c{i}")}))
            .collect::<Vec<_>>()
    });
    let mut mapping = serde_json::Map::new();
    for (i, c) in RubricCategory::ALL.iter().enumerate().rev() {
        mapping.insert(
            c.label().to_string(),
            json!({"score": (i % 5) + 1, "critique": format!("c{i}")}),
        );
    }
    let mapping = json!({"doc_context": "Lab report", "audit_results": mapping});

    assert_eq!(
        normalize(&list.to_string()).unwrap(),
        normalize(&mapping.to_string()).unwrap()
    );
}

#[test]
fn test_prose_only_is_malformed_and_keeps_raw() {
    let raw = "The assessment looks robust overall; I would give it a 4.";
    match normalize_only(raw) {
        Err(AppError::Normalize(NormalizeError::MalformedResponse { raw: kept, .. })) => {
            assert_eq!(kept, raw);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_saved_response_to_report() {
    let result = normalize_only(&messy_response()).unwrap();
    let text = render_text(&result);
    assert!(text.contains("Total score: 31/50"));

    let dir = std::env::temp_dir().join(format!("integrity_audit_it_{}", std::process::id()));
    let written = tokio_test::block_on(ReportWriter::new(&dir).write(&result)).unwrap();

    let saved = std::fs::read_to_string(&written.json_path).unwrap();
    assert_eq!(normalize(&saved).unwrap(), result);

    std::fs::remove_dir_all(&dir).unwrap();
}
