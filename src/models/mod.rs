pub mod audit;
pub mod category;

pub use audit::{AuditResult, CategoryFinding, Score, Susceptibility};
pub use category::RubricCategory;
