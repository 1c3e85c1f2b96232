//! Write-once context store for a single pipeline run.

use super::ContextValue;
use crate::errors::DuplicateWriteError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A resolved context entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// The value written under the key.
    pub value: ContextValue,
    /// When the key resolved.
    pub resolved_at: DateTime<Utc>,
    /// The step that wrote the key, or `None` for initial inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
}

/// The run-scoped key/value store.
///
/// Every key is written at most once. Reading a key that has not resolved
/// yet returns `Absent`; use [`ContextStore::is_resolved`] to tell the two
/// apart. The executor is the only writer and owns the store exclusively,
/// so writes take `&mut self` and need no locking.
#[derive(Debug, Default, Clone)]
pub struct ContextStore {
    entries: HashMap<String, ContextEntry>,
}

impl ContextStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the value for a key, `Absent` if unresolved.
    #[must_use]
    pub fn get(&self, key: &str) -> ContextValue {
        self.entries
            .get(key)
            .map(|entry| entry.value.clone())
            .unwrap_or_default()
    }

    /// Returns the full entry for a resolved key.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&ContextEntry> {
        self.entries.get(key)
    }

    /// Returns true if the key has been written (as `Present` or `Absent`).
    #[must_use]
    pub fn is_resolved(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Writes a key.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateWriteError` if the key is already resolved.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Result<(), DuplicateWriteError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(DuplicateWriteError::new(key));
        }

        self.entries.insert(
            key,
            ContextEntry {
                value: value.into(),
                resolved_at: Utc::now(),
                writer: None,
            },
        );
        Ok(())
    }

    /// Publishes every output of one step at once.
    ///
    /// Either all keys are written or none are; a reader never sees a
    /// partial set of a step's outputs.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateWriteError` naming the first conflicting key.
    pub fn publish(
        &mut self,
        writer: &str,
        outputs: impl IntoIterator<Item = (String, ContextValue)>,
    ) -> Result<(), DuplicateWriteError> {
        let outputs: Vec<_> = outputs.into_iter().collect();

        let mut seen = std::collections::HashSet::new();
        for (key, _) in &outputs {
            if self.entries.contains_key(key) || !seen.insert(key.as_str()) {
                return Err(DuplicateWriteError::new(key).with_writer(writer));
            }
        }

        let resolved_at = Utc::now();
        for (key, value) in outputs {
            self.entries.insert(
                key,
                ContextEntry {
                    value,
                    resolved_at,
                    writer: Some(writer.to_string()),
                },
            );
        }
        Ok(())
    }

    /// Returns the number of resolved keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no key has resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an ordered, serializable copy of the store.
    #[must_use]
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            entries: self
                .entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect(),
        }
    }
}

/// An immutable copy of a run's context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    entries: BTreeMap<String, ContextEntry>,
}

impl ContextSnapshot {
    /// Gets the value for a key, `Absent` if the key never resolved.
    #[must_use]
    pub fn get(&self, key: &str) -> ContextValue {
        self.entries
            .get(key)
            .map(|entry| entry.value.clone())
            .unwrap_or_default()
    }

    /// Returns the entry for a key.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&ContextEntry> {
        self.entries.get(key)
    }

    /// Returns when a key resolved.
    #[must_use]
    pub fn resolved_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| entry.resolved_at)
    }

    /// Iterates over the resolved keys in lexical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of resolved keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_reads_absent() {
        let store = ContextStore::new();
        assert!(store.get("missing").is_absent());
        assert!(!store.is_resolved("missing"));
    }

    #[test]
    fn test_set_is_write_once() {
        let mut store = ContextStore::new();
        store.set("notesText", "idea").unwrap();

        let err = store.set("notesText", "other").unwrap_err();
        assert_eq!(err.key, "notesText");
        assert_eq!(store.get("notesText").as_text(), Some("idea"));
    }

    #[test]
    fn test_absent_counts_as_written() {
        let mut store = ContextStore::new();
        store.set("audio", ContextValue::Absent).unwrap();

        assert!(store.is_resolved("audio"));
        assert!(store.set("audio", "late").is_err());
    }

    #[test]
    fn test_publish_is_all_or_nothing() {
        let mut store = ContextStore::new();
        store.set("b", "existing").unwrap();

        let result = store.publish(
            "producer",
            vec![
                ("a".to_string(), ContextValue::text("new")),
                ("b".to_string(), ContextValue::text("clash")),
            ],
        );

        let err = result.unwrap_err();
        assert_eq!(err.key, "b");
        assert_eq!(err.writer.as_deref(), Some("producer"));
        assert!(!store.is_resolved("a"));
    }

    #[test]
    fn test_publish_records_writer() {
        let mut store = ContextStore::new();
        store
            .publish("transcribe", vec![("transcript".to_string(), ContextValue::text("hi"))])
            .unwrap();

        let entry = store.entry("transcript").unwrap();
        assert_eq!(entry.writer.as_deref(), Some("transcribe"));
    }

    #[test]
    fn test_snapshot_is_ordered() {
        let mut store = ContextStore::new();
        store.set("z", "1").unwrap();
        store.set("a", "2").unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["a", "z"]);
        assert!(snapshot.resolved_at("a").is_some());
        assert!(snapshot.get("nope").is_absent());
    }
}
