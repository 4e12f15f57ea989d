//! The grouping engine.
//!
//! One synchronous pass over the input builds an insertion-order map
//! of group key → member indices, then emits one output record per
//! group in the configured order. Input records are read-only; members
//! are cloned into the output unmodified.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;

use crate::config::{GroupConfig, MissingValuePolicy, SortGroups};
use crate::error::ConfigResult;
use crate::group::{key::normalize_key, path::resolve, Diagnostics};

/// One output group: the built record plus the original input indices
/// of every member, in input order.
#[derive(Debug, Clone)]
pub struct GroupedRecord {
    /// The output record (group key field, member array, count).
    pub record: Value,
    /// Input positions of the members, for lineage/debugging.
    pub source_rows: Vec<usize>,
}

/// Group `records` by the configured field.
///
/// Records whose field is absent or null follow the configured
/// missing-value policy. When the field resolves in no record at all
/// and the policy is `skip`, a hint is raised through `diagnostics`
/// and the result is empty; that situation is not an error.
///
/// Fails only on invalid configuration, before any record is touched.
pub fn group_records(
    records: &[Value],
    config: &GroupConfig,
    diagnostics: &mut dyn Diagnostics,
) -> ConfigResult<Vec<GroupedRecord>> {
    config.validate()?;
    let path = config.field_path();

    if records.is_empty() {
        return Ok(Vec::new());
    }

    // Insertion order of keys is first-seen order; members keep input
    // order within their group.
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    let mut any_resolved = false;

    for (row, record) in records.iter().enumerate() {
        let key = match resolve(record, path, config.options.disable_dot_notation) {
            Some(value) => {
                any_resolved = true;
                normalize_key(value)
            }
            None => match config.options.handle_missing_values {
                MissingValuePolicy::Skip => continue,
                MissingValuePolicy::GroupUndefined => "undefined".to_string(),
                MissingValuePolicy::GroupNull => "null".to_string(),
                MissingValuePolicy::GroupEmpty => String::new(),
            },
        };
        groups.entry(key).or_default().push(row);
    }

    if !any_resolved && config.options.handle_missing_values == MissingValuePolicy::Skip {
        diagnostics.hint(format!("Field '{}' not found in any record", path));
        return Ok(Vec::new());
    }

    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<(String, Vec<usize>)> = groups.into_iter().collect();
    match config.options.sort_groups {
        SortGroups::None => {}
        SortGroups::Asc => entries.sort_by(|a, b| compare_keys(&a.0, &b.0)),
        SortGroups::Desc => entries.sort_by(|a, b| compare_keys(&b.0, &a.0)),
    }

    let output = entries
        .into_iter()
        .map(|(key, rows)| build_group(records, config, key, rows))
        .collect();

    Ok(output)
}

/// Lexicographic comparison of group keys: case-insensitive primary
/// order with a case-sensitive tiebreak, so "apple" and "Apple" sort
/// together the way a collation-aware comparison would.
fn compare_keys(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

/// Build one output record from a finished group.
fn build_group(
    records: &[Value],
    config: &GroupConfig,
    key: String,
    rows: Vec<usize>,
) -> GroupedRecord {
    let mut obj = Map::new();

    if config.include_group_key {
        obj.insert(config.group_key_field().to_string(), Value::String(key));
    }

    let members: Vec<Value> = rows.iter().map(|&row| records[row].clone()).collect();
    obj.insert(config.output_field_name.clone(), Value::Array(members));

    if config.options.include_item_count {
        obj.insert(
            config.options.item_count_field_name.clone(),
            json!(rows.len()),
        );
    }

    GroupedRecord {
        record: Value::Object(obj),
        source_rows: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{CollectedDiagnostics, NullDiagnostics};
    use serde_json::json;

    fn group(records: &[Value], config: &GroupConfig) -> Vec<GroupedRecord> {
        group_records(records, config, &mut NullDiagnostics).unwrap()
    }

    fn fruit_records() -> Vec<Value> {
        vec![
            json!({"category": "Fruit", "n": "Apple"}),
            json!({"category": "Veg", "n": "Carrot"}),
            json!({"category": "Fruit", "n": "Banana"}),
        ]
    }

    #[test]
    fn test_basic_scenario() {
        let groups = group(&fruit_records(), &GroupConfig::new("category"));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].record["category"], "Fruit");
        assert_eq!(
            groups[0].record["items"],
            json!([
                {"category": "Fruit", "n": "Apple"},
                {"category": "Fruit", "n": "Banana"}
            ])
        );
        assert_eq!(groups[1].record["category"], "Veg");
        assert_eq!(groups[1].record["items"], json!([{"category": "Veg", "n": "Carrot"}]));
    }

    #[test]
    fn test_first_seen_order() {
        let records = vec![
            json!({"k": "b"}),
            json!({"k": "c"}),
            json!({"k": "a"}),
            json!({"k": "c"}),
        ];
        let groups = group(&records, &GroupConfig::new("k"));
        let keys: Vec<&str> = groups.iter().map(|g| g.record["k"].as_str().unwrap()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_empty_input() {
        let groups = group(&[], &GroupConfig::new("category"));
        assert!(groups.is_empty());
    }

    #[test]
    fn test_blank_field_is_config_error() {
        let err = group_records(&fruit_records(), &GroupConfig::new("  "), &mut NullDiagnostics);
        assert!(err.is_err());
    }

    #[test]
    fn test_round_trip_permutation() {
        let records = vec![
            json!({"k": "a", "i": 0}),
            json!({"k": "b", "i": 1}),
            json!({"k": "a", "i": 2}),
            json!({"i": 3}),
            json!({"k": "b", "i": 4}),
        ];
        let groups = group(&records, &GroupConfig::new("k"));

        // Concatenated members are a permutation of the skip-filtered
        // input: each resolvable record appears exactly once.
        let mut seen: Vec<i64> = groups
            .iter()
            .flat_map(|g| g.record["items"].as_array().unwrap())
            .map(|r| r["i"].as_i64().unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 4]);

        // Within a group, input order is preserved.
        let a_items: Vec<i64> = groups[0].record["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["i"].as_i64().unwrap())
            .collect();
        assert_eq!(a_items, vec![0, 2]);
    }

    #[test]
    fn test_number_and_string_share_group() {
        let records = vec![
            json!({"code": 5, "n": "num"}),
            json!({"code": "5", "n": "str"}),
        ];
        let groups = group(&records, &GroupConfig::new("code"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].record["code"], "5");
        assert_eq!(groups[0].record["items"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_nested_path_key_field_name() {
        let records = vec![
            json!({"user": {"country": "FR"}}),
            json!({"user": {"country": "DE"}}),
            json!({"user": {"country": "FR"}}),
        ];
        let groups = group(&records, &GroupConfig::new("user.country"));
        assert_eq!(groups.len(), 2);
        // Key field is the last path segment.
        assert_eq!(groups[0].record["country"], "FR");
        assert_eq!(groups[0].record["items"].as_array().unwrap().len(), 2);
        assert_eq!(groups[1].record["country"], "DE");
    }

    #[test]
    fn test_missing_skip_drops_record() {
        let records = vec![
            json!({"category": "Fruit"}),
            json!({"other": 1}),
        ];
        let groups = group(&records, &GroupConfig::new("category"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].source_rows, vec![0]);
    }

    #[test]
    fn test_all_missing_skip_hints_and_returns_empty() {
        let records = vec![json!({"a": 1}), json!({"b": 2})];
        let mut diagnostics = CollectedDiagnostics::default();
        let groups =
            group_records(&records, &GroupConfig::new("category"), &mut diagnostics).unwrap();

        assert!(groups.is_empty());
        assert_eq!(diagnostics.hints.len(), 1);
        assert!(diagnostics.hints[0].contains("category"));
        assert!(diagnostics.hints[0].contains("not found in any record"));
    }

    #[test]
    fn test_all_missing_group_null() {
        let records = vec![json!({"a": 1}), json!({"b": 2})];
        let mut config = GroupConfig::new("category");
        config.options.handle_missing_values = MissingValuePolicy::GroupNull;

        let mut diagnostics = CollectedDiagnostics::default();
        let groups = group_records(&records, &config, &mut diagnostics).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].record["category"], "null");
        assert_eq!(groups[0].record["items"].as_array().unwrap().len(), 2);
        // Substituted keys are not "field never resolved" errors.
        assert!(diagnostics.hints.is_empty());
    }

    #[test]
    fn test_missing_policies_key_text() {
        let records = vec![json!({"other": 1}), json!({"category": "x"})];

        let mut config = GroupConfig::new("category");
        config.options.handle_missing_values = MissingValuePolicy::GroupUndefined;
        let groups = group(&records, &config);
        assert_eq!(groups[0].record["category"], "undefined");

        config.options.handle_missing_values = MissingValuePolicy::GroupEmpty;
        let groups = group(&records, &config);
        assert_eq!(groups[0].record["category"], "");
    }

    #[test]
    fn test_explicit_null_follows_missing_policy() {
        let records = vec![
            json!({"category": null, "n": 1}),
            json!({"category": "Fruit", "n": 2}),
        ];
        let groups = group(&records, &GroupConfig::new("category"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].record["category"], "Fruit");
    }

    #[test]
    fn test_sort_asc_and_desc() {
        let records = vec![
            json!({"k": "banana"}),
            json!({"k": "Apple"}),
            json!({"k": "cherry"}),
        ];
        let mut config = GroupConfig::new("k");

        config.options.sort_groups = SortGroups::Asc;
        let keys: Vec<String> = group(&records, &config)
            .iter()
            .map(|g| g.record["k"].as_str().unwrap().to_string())
            .collect();
        // Case-insensitive primary order.
        assert_eq!(keys, vec!["Apple", "banana", "cherry"]);

        config.options.sort_groups = SortGroups::Desc;
        let keys: Vec<String> = group(&records, &config)
            .iter()
            .map(|g| g.record["k"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["cherry", "banana", "Apple"]);
    }

    #[test]
    fn test_sort_asc_idempotent() {
        let records = vec![
            json!({"k": "b", "i": 0}),
            json!({"k": "a", "i": 1}),
            json!({"k": "b", "i": 2}),
        ];
        let mut config = GroupConfig::new("k");
        config.options.sort_groups = SortGroups::Asc;

        let first = group(&records, &config);
        let first_keys: Vec<String> = first
            .iter()
            .map(|g| g.record["k"].as_str().unwrap().to_string())
            .collect();

        // Group the output again by the emitted key field: same order.
        let regrouped_input: Vec<Value> = first.iter().map(|g| g.record.clone()).collect();
        let second = group(&regrouped_input, &config);
        let second_keys: Vec<String> = second
            .iter()
            .map(|g| g.record["k"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(first_keys, second_keys);
    }

    #[test]
    fn test_include_item_count() {
        let mut config = GroupConfig::new("category");
        config.options.include_item_count = true;
        let groups = group(&fruit_records(), &config);
        assert_eq!(groups[0].record["itemCount"], 2);
        assert_eq!(groups[1].record["itemCount"], 1);

        config.options.item_count_field_name = "total".to_string();
        let groups = group(&fruit_records(), &config);
        assert_eq!(groups[0].record["total"], 2);
    }

    #[test]
    fn test_exclude_group_key() {
        let mut config = GroupConfig::new("category");
        config.include_group_key = false;
        let groups = group(&fruit_records(), &config);
        assert!(groups[0].record.get("category").is_none());
        assert!(groups[0].record.get("items").is_some());
    }

    #[test]
    fn test_output_field_name() {
        let mut config = GroupConfig::new("category");
        config.output_field_name = "records".to_string();
        let groups = group(&fruit_records(), &config);
        assert!(groups[0].record.get("records").is_some());
        assert!(groups[0].record.get("items").is_none());
    }

    #[test]
    fn test_disable_dot_notation() {
        let records = vec![
            json!({"a.b": "x"}),
            json!({"a.b": "y"}),
            json!({"a.b": "x"}),
        ];
        let mut config = GroupConfig::new("a.b");
        config.options.disable_dot_notation = true;
        let groups = group(&records, &config);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].record["a.b"], "x");
        assert_eq!(groups[0].record["items"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_lineage_covers_every_member() {
        let records = vec![
            json!({"k": "a"}),
            json!({"k": "b"}),
            json!({"k": "a"}),
            json!({"k": "a"}),
        ];
        let groups = group(&records, &GroupConfig::new("k"));
        assert_eq!(groups[0].source_rows, vec![0, 2, 3]);
        assert_eq!(groups[1].source_rows, vec![1]);
    }

    #[test]
    fn test_non_object_records_follow_missing_policy() {
        let records = vec![json!("scalar"), json!({"k": "a"}), json!([1, 2])];
        let groups = group(&records, &GroupConfig::new("k"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].source_rows, vec![1]);
    }

    #[test]
    fn test_input_records_not_mutated() {
        let records = fruit_records();
        let before = records.clone();
        let _ = group(&records, &GroupConfig::new("category"));
        assert_eq!(records, before);
    }
}
