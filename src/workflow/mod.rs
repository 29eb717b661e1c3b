pub mod audit_flow;

pub use audit_flow::{normalize_only, AuditFlow};
