//! # Integrity Audit
//!
//! 对高等教育评估说明做"诚信债务"审计：把评估文本交给大模型，
//! 按十个固定维度打分，并把不可靠的模型输出规整为固定形状的结果。
//!
//! ## 架构设计
//!
//! ### ① 模型层（Models）
//! - `models/` - `RubricCategory` 十个维度、`AuditResult` 评估结果
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只做一件事
//! - `BriefIntake` - 读取、校验、截断评估文本
//! - `LlmService` - 请求模型评估（有限重试）
//! - `normalizer` - 把模型原始文本规整为 `AuditResult`（纯函数）
//! - `ReportWriter` - 输出文本 / Markdown / JSON 报告
//!
//! ### ③ 流程层（Workflow）
//! - `AuditFlow` - 一次评估：校验 → 请求 → 规整
//!
//! ### ④ 编排层（App）
//! - `app` - 命令行解析、打印与保存报告
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, NormalizeError};
pub use models::{AuditResult, CategoryFinding, RubricCategory, Score, Susceptibility};
pub use services::normalizer::normalize;
pub use workflow::AuditFlow;
