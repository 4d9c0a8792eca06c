//! Report template management
//!
//! One JSON template per report type, each carrying a system prompt, a user
//! prompt with `{name}` placeholders and the declared variable defaults.
//!
//! # Architecture
//!
//! - **Built-in templates**: JSON files in `report-engine/templates/` embedded at compile time
//! - **Directory templates**: the same file names read from a configured directory
//!
//! A configured directory is authoritative: a missing file there is an error,
//! not a silent fallback to the built-in copy.
//!
//! # Template format
//!
//! ```json
//! {
//!   "name": "Sales Performance Report",
//!   "prompt": { "system": "...", "user": "Report for {audience_role}: {sales_data}" },
//!   "variables": { "timeframe": { "default": "last quarter" } }
//! }
//! ```

mod defaults;
mod loader;
mod types;

// Re-export public API
pub use loader::{validate_and_parse_template, TemplateInfo, TemplateStore};
pub use types::{PromptSpec, Template, VariableSpec};
