//! Report assembly and rendering.

pub mod builder;
pub mod generator;

pub use builder::{build_report, record_decisions, reports_below, RecordDecision, RecordStatus};
pub use generator::{generate_json, generate_markdown, generate_markdown_report};
