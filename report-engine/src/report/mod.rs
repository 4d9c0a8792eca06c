//! Report module - turns uploaded data into an executive-report prompt
//!
//! This module contains:
//! - Templates for the four report domains (sales, HR, finance, support)
//! - Ingestion, region localization and digesting of CSV/JSON/Text input
//! - KPI aggregation with Indian or thousands digit grouping
//! - Prompt rendering with declared defaults
//! - LLM client for the Gemini and OpenRouter providers

pub mod error;
pub mod ingest;
pub mod kind;
pub mod kpi;
pub mod llm_client;
pub mod localize;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod summarize;
pub mod table;
pub mod templates;

// Re-export commonly used items
pub use error::{ParseError, ProviderError, TemplateError};
pub use ingest::ingest;
pub use kind::{InputKind, ReportKind};
pub use kpi::build_kpi_table;
pub use llm_client::{generate_report, GenerationParams, LLMProvider};
pub use localize::{localize_regions, RegionMapping};
pub use pipeline::{prepare, PreparedReport, ReportRequest};
pub use render::{render, PromptPair};
pub use summarize::summarize;
pub use templates::{Template, TemplateStore};
