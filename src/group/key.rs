//! Group key normalization.
//!
//! Every resolved value is converted to a canonical string, and two
//! records are in the same group exactly when their strings match.
//! The conversion is total and deterministic: the same value always
//! yields the same key, including nested objects and arrays.

use serde_json::Value;

/// Canonical string form of a resolved grouping value.
///
/// Strings pass through unchanged; numbers and booleans use their
/// display form; objects and arrays use compact JSON. Equal-looking
/// values of different types coerce to the same key: number `5` and
/// string `"5"` are one group. That coercion is intended behavior,
/// codified by tests.
pub fn normalize_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Display for Value renders compact JSON, stable per value.
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_passthrough() {
        assert_eq!(normalize_key(&json!("Fruit")), "Fruit");
        assert_eq!(normalize_key(&json!("")), "");
    }

    #[test]
    fn test_number_and_string_coerce_identically() {
        assert_eq!(normalize_key(&json!(5)), "5");
        assert_eq!(normalize_key(&json!("5")), "5");
        assert_eq!(normalize_key(&json!(2.5)), "2.5");
    }

    #[test]
    fn test_booleans() {
        assert_eq!(normalize_key(&json!(true)), "true");
        assert_eq!(normalize_key(&json!(false)), "false");
    }

    #[test]
    fn test_structured_values_are_stable() {
        let a = json!({"country": "FR", "city": "Lyon"});
        let b = json!({"country": "FR", "city": "Lyon"});
        // Same value, independently built: same key.
        assert_eq!(normalize_key(&a), normalize_key(&b));

        assert_eq!(normalize_key(&json!([1, "a"])), r#"[1,"a"]"#);
    }
}
