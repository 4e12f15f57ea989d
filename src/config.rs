//! Grouping configuration.
//!
//! [`GroupConfig`] is the full option surface honored by the engine.
//! Field names follow the camelCase wire format used by the HTTP API
//! and by `--config` files:
//!
//! ```json
//! {
//!   "fieldToGroupBy": "user.country",
//!   "outputFieldName": "items",
//!   "includeGroupKey": true,
//!   "options": {
//!     "disableDotNotation": false,
//!     "handleMissingValues": "skip",
//!     "sortGroups": "asc",
//!     "includeItemCount": true,
//!     "itemCountFieldName": "itemCount"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// How to place records whose grouping field is absent or null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingValuePolicy {
    /// Drop the record from all groups.
    #[default]
    Skip,
    /// Group under the literal key `"undefined"`.
    GroupUndefined,
    /// Group under the literal key `"null"`.
    GroupNull,
    /// Group under the empty key `""`.
    GroupEmpty,
}

/// Emission order of the groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortGroups {
    /// First-seen insertion order.
    #[default]
    None,
    /// Lexicographic ascending order of group keys.
    Asc,
    /// Reverse of `Asc`.
    Desc,
}

/// Secondary options of the grouping engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOptions {
    /// Treat the whole grouping field as one literal key, supporting
    /// field names that contain dots.
    #[serde(default)]
    pub disable_dot_notation: bool,

    /// What to do with records whose field is absent or null.
    #[serde(default)]
    pub handle_missing_values: MissingValuePolicy,

    /// Emission order of the groups.
    #[serde(default)]
    pub sort_groups: SortGroups,

    /// Add a member-count field to each output record.
    #[serde(default)]
    pub include_item_count: bool,

    /// Name of the member-count field.
    #[serde(default = "default_item_count_field")]
    pub item_count_field_name: String,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            disable_dot_notation: false,
            handle_missing_values: MissingValuePolicy::default(),
            sort_groups: SortGroups::default(),
            include_item_count: false,
            item_count_field_name: default_item_count_field(),
        }
    }
}

/// Full grouping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// Path of the field to group by, dot-separated unless
    /// `options.disable_dot_notation` is set. Required, non-empty
    /// after trimming.
    pub field_to_group_by: String,

    /// Name of the output field holding the member array.
    #[serde(default = "default_output_field")]
    pub output_field_name: String,

    /// Embed the group key as a field of each output record.
    #[serde(default = "default_true")]
    pub include_group_key: bool,

    #[serde(default)]
    pub options: GroupOptions,
}

fn default_output_field() -> String {
    "items".to_string()
}

fn default_item_count_field() -> String {
    "itemCount".to_string()
}

fn default_true() -> bool {
    true
}

impl GroupConfig {
    /// Minimal configuration grouping by `field` with all defaults.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field_to_group_by: field.into(),
            output_field_name: default_output_field(),
            include_group_key: true,
            options: GroupOptions::default(),
        }
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration invariants. The grouping field must be
    /// non-empty after trimming whitespace.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.field_to_group_by.trim().is_empty() {
            return Err(ConfigError::EmptyGroupField);
        }
        Ok(())
    }

    /// The grouping path with surrounding whitespace removed.
    pub fn field_path(&self) -> &str {
        self.field_to_group_by.trim()
    }

    /// Name of the embedded group-key field: the last path segment,
    /// or the whole path when it has no dots or dot notation is
    /// disabled.
    pub fn group_key_field(&self) -> &str {
        let path = self.field_path();
        if self.options.disable_dot_notation {
            path
        } else {
            path.rsplit('.').next().unwrap_or(path)
        }
    }
}

/// Source of a validated grouping configuration.
///
/// The engine and pipeline depend on this abstraction rather than on
/// any particular shell (CLI flags, HTTP body, config file).
pub trait ConfigProvider {
    fn group_config(&self) -> ConfigResult<GroupConfig>;
}

impl ConfigProvider for GroupConfig {
    fn group_config(&self) -> ConfigResult<GroupConfig> {
        self.validate()?;
        Ok(self.clone())
    }
}
