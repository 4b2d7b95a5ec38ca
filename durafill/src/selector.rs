//! Selection of entries that need a duration

use crate::collection::{Collection, Entry, AUDIO_URL_FIELD};
use crate::schema::FieldSpec;
use serde_json::Value;

/// One unit of work for the worker pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichTask {
    /// Record id in the collection
    pub key: String,
    /// Remote audio reference
    pub audio_url: String,
}

/// True when the entry has a null duration and a string audio reference
///
/// An `audio_url` that is present but not a string (null, number, object)
/// counts as no reference, so the entry is never dispatched.
pub fn is_eligible(entry: &Entry, spec: FieldSpec) -> bool {
    audio_url(entry).is_some() && matches!(entry.get(spec.field_name()), Some(Value::Null) | None)
}

fn audio_url(entry: &Entry) -> Option<&str> {
    entry.get(AUDIO_URL_FIELD).and_then(Value::as_str)
}

/// Eligible entries in collection order
pub fn select_tasks(collection: &Collection, spec: FieldSpec) -> Vec<EnrichTask> {
    collection
        .iter()
        .filter(|(_, entry)| is_eligible(entry, spec))
        .filter_map(|(key, entry)| {
            audio_url(entry).map(|url| EnrichTask {
                key: key.to_string(),
                audio_url: url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selects_only_null_duration_with_url() {
        let collection = Collection::from_value(json!({
            "needs": {"duration": null, "audio_url": "http://x/needs.mp3"},
            "has_value": {"duration": 1500, "audio_url": "http://x/has.mp3"},
            "no_url": {"duration": null},
            "url_null": {"duration": null, "audio_url": null},
            "url_number": {"duration": null, "audio_url": 42},
            "zero": {"duration": 0, "audio_url": "http://x/zero.mp3"},
            "also_needs": {"duration": null, "audio_url": "http://x/also.mp3", "surah": 2}
        }))
        .unwrap();

        let tasks = select_tasks(&collection, FieldSpec::DurationSeconds);
        assert_eq!(
            tasks,
            vec![
                EnrichTask {
                    key: "needs".to_string(),
                    audio_url: "http://x/needs.mp3".to_string()
                },
                EnrichTask {
                    key: "also_needs".to_string(),
                    audio_url: "http://x/also.mp3".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_uses_detected_field_name() {
        let collection = Collection::from_value(json!({
            "a": {"duration_ms": null, "duration": 10, "audio_url": "http://x/a.mp3"}
        }))
        .unwrap();

        assert_eq!(select_tasks(&collection, FieldSpec::DurationMillis).len(), 1);
        assert!(select_tasks(&collection, FieldSpec::DurationSeconds).is_empty());
    }

    #[test]
    fn test_empty_when_nothing_eligible() {
        let collection = Collection::from_value(json!({"b": {"duration": 12000}})).unwrap();
        assert!(select_tasks(&collection, FieldSpec::DurationSeconds).is_empty());
    }
}
