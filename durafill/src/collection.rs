//! Collection loading and writing
//!
//! A collection is a JSON object mapping record ids to entry objects. Entries
//! are kept as raw JSON maps so that every field other than the duration is
//! written back exactly as it was read. Key order is preserved.

use crate::error::{EnrichError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Field holding the remote audio reference
pub const AUDIO_URL_FIELD: &str = "audio_url";

/// Suffix appended to the input file stem for the output file
pub const OUTPUT_SUFFIX: &str = "_updated";

/// One record: arbitrary named fields
pub type Entry = Map<String, Value>;

/// Keyed set of entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    entries: Map<String, Value>,
}

impl Collection {
    /// Build from a parsed JSON value, checking the two-level object shape
    pub fn from_value(value: Value) -> Result<Self> {
        let entries = match value {
            Value::Object(map) => map,
            other => {
                return Err(EnrichError::Parse(format!(
                    "top-level value must be an object, found {}",
                    kind_of(&other)
                )))
            }
        };

        if let Some((key, bad)) = entries.iter().find(|(_, v)| !v.is_object()) {
            return Err(EnrichError::Parse(format!(
                "entry '{}' must be an object, found {}",
                key,
                kind_of(bad)
            )));
        }

        Ok(Self { entries })
    }

    /// Parse collection JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| EnrichError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    /// Serialize with 4-space indentation; non-ASCII is written as-is
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries.serialize(&mut ser)?;
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key).and_then(Value::as_object)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.get_mut(key).and_then(Value::as_object_mut)
    }

    /// Entries in input order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_object().map(|entry| (k.as_str(), entry)))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read and parse a collection file
pub fn load_collection(path: &Path) -> Result<Collection> {
    let text = std::fs::read_to_string(path).map_err(|e| EnrichError::io(path, e))?;
    let collection = Collection::from_json_str(&text)?;

    debug!(path = %path.display(), entries = collection.len(), "Loaded collection");
    Ok(collection)
}

/// Write a collection atomically (temp file in the target directory, then rename)
pub fn write_collection(path: &Path, collection: &Collection) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| EnrichError::io(&dir, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| EnrichError::io(&dir, e))?;
    let text = collection
        .to_json_string()
        .map_err(|e| EnrichError::io(path, e.into()))?;
    temp.write_all(text.as_bytes())
        .map_err(|e| EnrichError::io(path, e))?;
    temp.flush().map_err(|e| EnrichError::io(path, e))?;
    temp.persist(path).map_err(|e| EnrichError::io(path, e.error))?;

    info!(path = %path.display(), entries = collection.len(), "Collection written");
    Ok(())
}

/// Derive the output path
///
/// `dir/name.json` becomes `dir/name_updated.json`, or
/// `output_dir/name_updated.json` when an output directory is given.
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, OUTPUT_SUFFIX),
    };

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_rejects_non_object_top_level() {
        let result = Collection::from_json_str("[1, 2, 3]");
        assert!(matches!(result, Err(EnrichError::Parse(_))));
    }

    #[test]
    fn test_rejects_non_object_entry() {
        let result = Collection::from_json_str(r#"{"a": {"duration": null}, "b": 5}"#);
        match result {
            Err(EnrichError::Parse(msg)) => assert!(msg.contains("'b'")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_invalid_json() {
        let result = Collection::from_json_str("{\"a\": ");
        assert!(matches!(result, Err(EnrichError::Parse(_))));
    }

    #[test]
    fn test_preserves_key_order_and_unknown_fields() {
        let text = r#"{"z": {"duration": 1, "extra": [1, 2]}, "a": {"duration": null, "note": "نص"}}"#;
        let collection = Collection::from_json_str(text).unwrap();

        let keys: Vec<&str> = collection.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a"]);

        let reparsed = Collection::from_json_str(&collection.to_json_string().unwrap()).unwrap();
        assert_eq!(reparsed, collection);
        assert!(collection.to_json_string().unwrap().contains("نص"));
    }

    #[test]
    fn test_pretty_output_uses_four_spaces() {
        let collection = Collection::from_value(json!({"a": {"duration": 1}})).unwrap();
        let text = collection.to_json_string().unwrap();
        assert!(text.contains("\n    \"a\": {\n        \"duration\": 1\n    }"));
    }

    #[test]
    fn test_output_path_next_to_input() {
        let path = output_path(Path::new("data/audio/reciter.json"), None);
        assert_eq!(path, PathBuf::from("data/audio/reciter_updated.json"));
    }

    #[test]
    fn test_output_path_in_output_dir() {
        let path = output_path(Path::new("data/audio/reciter.json"), Some(Path::new("/out")));
        assert_eq!(path, PathBuf::from("/out/reciter_updated.json"));
    }

    #[test]
    fn test_output_path_without_extension() {
        let path = output_path(Path::new("records"), None);
        assert_eq!(path, PathBuf::from("records_updated"));
    }

    #[test]
    fn test_write_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("out.json");
        let collection =
            Collection::from_value(json!({"k": {"duration_ms": 250, "audio_url": "http://x/k.mp3"}}))
                .unwrap();

        write_collection(&path, &collection).unwrap();
        assert_eq!(load_collection(&path).unwrap(), collection);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = load_collection(Path::new("/nonexistent/collection.json"));
        assert!(matches!(result, Err(EnrichError::Io { .. })));
    }
}
