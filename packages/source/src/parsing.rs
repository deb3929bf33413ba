//! Shared JSON lookup helpers for raw festival records.
//!
//! Field mappings address values with dot-separated paths such as
//! `fields.nom_du_festival` or `geometry.coordinates`.

use serde_json::Value;

/// Follows a dot-separated path through nested JSON objects.
#[must_use]
pub fn get_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |value, segment| value.get(segment))
}

/// Reads a path as display text.
///
/// Strings are trimmed and numbers are rendered, since some upstreams
/// store years and postcodes as numbers. Empty strings, `null`, and
/// other JSON types are `None`.
#[must_use]
pub fn get_text(record: &Value, path: &str) -> Option<String> {
    match get_path(record, path)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Tries each path in order and returns the first non-empty text value.
#[must_use]
pub fn first_text(record: &Value, paths: &[String]) -> Option<String> {
    paths.iter().find_map(|path| get_text(record, path))
}

/// Reads a JSON number, or a string holding one.
#[must_use]
pub fn as_lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a JSON array whose elements are all numeric.
///
/// Returns an empty vector when any element is not numeric, so that the
/// array still counts as present but structurally invalid.
#[must_use]
pub fn as_number_array(value: &Value) -> Option<Vec<f64>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(as_lenient_f64)
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn follows_nested_paths() {
        let record = json!({"fields": {"nom_du_festival": "Jazz in Marciac"}});
        assert_eq!(
            get_text(&record, "fields.nom_du_festival").as_deref(),
            Some("Jazz in Marciac")
        );
        assert!(get_path(&record, "fields.missing").is_none());
        assert!(get_path(&record, "fields.nom_du_festival.deeper").is_none());
    }

    #[test]
    fn blank_strings_are_absent() {
        let record = json!({"a": "   ", "b": null, "c": true});
        assert!(get_text(&record, "a").is_none());
        assert!(get_text(&record, "b").is_none());
        assert!(get_text(&record, "c").is_none());
    }

    #[test]
    fn numbers_render_as_text() {
        let record = json!({"annee": 1978});
        assert_eq!(get_text(&record, "annee").as_deref(), Some("1978"));
    }

    #[test]
    fn first_text_skips_empty_candidates() {
        let record = json!({"recordid": "", "id": 42});
        let paths = vec!["recordid".to_string(), "id".to_string()];
        assert_eq!(first_text(&record, &paths).as_deref(), Some("42"));
    }

    #[test]
    fn number_arrays_accept_numeric_strings() {
        assert_eq!(
            as_number_array(&json!(["48.86", 2.35])),
            Some(vec![48.86, 2.35])
        );
        assert_eq!(as_number_array(&json!([48.86, "north"])), Some(vec![]));
        assert_eq!(as_number_array(&json!({"lat": 1})), None);
    }
}
