//! Shared collection and duration write-back
//!
//! Every write goes through one `tokio::sync::Mutex`, so two workers can never
//! interleave updates, including updates to the same key.

use crate::collection::Collection;
use crate::error::TaskError;
use crate::schema::FieldSpec;
use crate::selector::is_eligible;
use serde_json::{Number, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Collection shared between pool workers
#[derive(Debug, Clone)]
pub struct SharedCollection {
    inner: Arc<Mutex<Collection>>,
}

impl SharedCollection {
    pub fn new(collection: Collection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(collection)),
        }
    }

    /// Store `seconds` (scaled to milliseconds) under the detected field
    ///
    /// Returns the stored millisecond value.
    pub async fn merge(&self, key: &str, seconds: f64, spec: FieldSpec) -> Result<f64, TaskError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(TaskError::Decode(format!("Invalid duration: {}", seconds)));
        }

        let millis = seconds * spec.scale();
        let value = duration_value(millis)
            .ok_or_else(|| TaskError::Decode(format!("Invalid duration: {}", seconds)))?;

        let mut collection = self.inner.lock().await;
        let entry = collection
            .get_mut(key)
            .ok_or_else(|| TaskError::Internal(format!("Entry '{}' missing from collection", key)))?;
        entry.insert(spec.field_name().to_string(), value);

        Ok(millis)
    }

    /// Whether `key` still has a null duration and an audio reference
    pub async fn is_eligible(&self, key: &str, spec: FieldSpec) -> bool {
        let collection = self.inner.lock().await;
        collection
            .get(key)
            .map(|entry| is_eligible(entry, spec))
            .unwrap_or(false)
    }

    /// Clone of the current contents
    pub async fn snapshot(&self) -> Collection {
        self.inner.lock().await.clone()
    }

    /// Take the collection back once no worker holds a handle
    ///
    /// Falls back to a clone if another handle is still alive.
    pub async fn into_inner(self) -> Collection {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner(),
            Err(shared) => shared.lock().await.clone(),
        }
    }
}

/// Whole milliseconds become JSON integers, anything else a float
fn duration_value(millis: f64) -> Option<Value> {
    if millis.fract() == 0.0 && millis <= u64::MAX as f64 {
        Some(Value::Number(Number::from(millis as u64)))
    } else {
        Number::from_f64(millis).map(Value::Number)
    }
}
