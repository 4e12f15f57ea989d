//! # regroup - group JSON records by a (possibly nested) field
//!
//! regroup takes a finite sequence of records (JSON objects, from a
//! JSON array or a CSV file) and produces one record per distinct
//! value of a configured field: the collected members, an optional
//! group-key field, and an optional count.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV / JSON  │────▶│   Parser    │────▶│   Grouping  │────▶│  Grouped    │
//! │   input     │     │ (auto-enc)  │     │   engine    │     │  records    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use regroup::{group_records, GroupConfig, NullDiagnostics};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"category": "Fruit", "n": "Apple"}),
//!     json!({"category": "Veg", "n": "Carrot"}),
//!     json!({"category": "Fruit", "n": "Banana"}),
//! ];
//! let groups = group_records(&records, &GroupConfig::new("category"), &mut NullDiagnostics)?;
//! assert_eq!(groups.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Grouping configuration and `ConfigProvider`
//! - [`parser`] - CSV parsing with auto-detection
//! - [`group`] - Path resolver, key normalizer, engine, pipeline
//! - [`api`] - HTTP API server and SSE log streaming

// Core modules
pub mod config;
pub mod error;

// Parsing
pub mod parser;

// Grouping
pub mod group;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, CsvError, PipelineError};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{ConfigProvider, GroupConfig, GroupOptions, MissingValuePolicy, SortGroups};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use group::{
    group_records, normalize_key, resolve, CollectedDiagnostics, Diagnostics, GroupedRecord,
    NullDiagnostics,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    csv_to_records, detect_delimiter, detect_encoding, decode_content, parse_bytes_auto,
    parse_csv_file_auto, ParseResult,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use group::pipeline::{
    group_csv_bytes, group_file, group_json_str, group_values, CsvInfo, GroupReport,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, GroupRequest, GroupResponse, ResponseMetadata};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
