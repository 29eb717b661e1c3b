pub mod intake;
pub mod llm_service;
pub mod normalizer;
pub mod prompt;
pub mod report_writer;

pub use intake::{Brief, BriefIntake};
pub use llm_service::LlmService;
pub use normalizer::{normalize, normalize_detailed, CategoryGap, Normalized};
pub use report_writer::{render_markdown, render_text, ReportWriter, WrittenReport};
