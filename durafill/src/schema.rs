//! Duration field detection
//!
//! A collection stores its durations under exactly one of two field names.
//! The name is detected once, up front, and every later read and write uses
//! the resulting [`FieldSpec`].

use crate::collection::Collection;
use crate::error::{EnrichError, Result};
use std::fmt;

/// Which duration field the collection uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSpec {
    /// `duration`
    DurationSeconds,
    /// `duration_ms`
    DurationMillis,
}

impl FieldSpec {
    /// JSON field name read and written for this spec
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldSpec::DurationSeconds => "duration",
            FieldSpec::DurationMillis => "duration_ms",
        }
    }

    /// Factor applied to probed seconds before the value is stored
    ///
    /// Both conventions hold milliseconds; only the field name differs.
    pub fn scale(&self) -> f64 {
        1000.0
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Detect the duration field used by every entry
///
/// `duration` wins when all entries carry it; otherwise all entries must
/// carry `duration_ms`. Anything else, including a mix of the two, is a
/// schema error. An empty collection detects as `duration`.
pub fn detect_field_spec(collection: &Collection) -> Result<FieldSpec> {
    for spec in [FieldSpec::DurationSeconds, FieldSpec::DurationMillis] {
        let name = spec.field_name();
        if collection.iter().all(|(_, entry)| entry.contains_key(name)) {
            tracing::debug!(field = name, "Detected duration field");
            return Ok(spec);
        }
        tracing::debug!(field = name, "Duration field missing on some entries");
    }

    let (with_seconds, with_millis) =
        collection
            .iter()
            .fold((0usize, 0usize), |(secs, millis), (_, entry)| {
                (
                    secs + entry.contains_key(FieldSpec::DurationSeconds.field_name()) as usize,
                    millis + entry.contains_key(FieldSpec::DurationMillis.field_name()) as usize,
                )
            });

    if with_seconds == 0 && with_millis == 0 {
        Err(EnrichError::Schema(
            "no entry has a 'duration' or 'duration_ms' field".to_string(),
        ))
    } else {
        Err(EnrichError::Schema(format!(
            "mixed duration fields: {} of {} entries have 'duration', {} have 'duration_ms'",
            with_seconds,
            collection.len(),
            with_millis
        )))
    }
}
