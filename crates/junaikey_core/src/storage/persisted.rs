//! Whole-namespace JSON document load/save helpers.

use super::{StorageError, StoragePort, StorageResult};
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Where a loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the stored document.
    Stored,
    /// Nothing stored yet; default seed used.
    Missing,
    /// Stored document failed to decode; default seed used.
    Corrupt,
    /// Backend read failed; default seed used.
    Unreadable,
}

impl LoadSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Missing => "missing",
            Self::Corrupt => "corrupt",
            Self::Unreadable => "unreadable",
        }
    }

    /// Returns whether the default seed replaced stored data.
    pub fn fell_back(self) -> bool {
        matches!(self, Self::Corrupt | Self::Unreadable)
    }
}

/// Loaded document plus provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub source: LoadSource,
}

/// Loads `namespace` or falls back to `default` without ever failing.
///
/// Corrupt payloads are not logged verbatim; only decode position metadata
/// is emitted.
pub fn load_or_default<T: DeserializeOwned>(
    storage: &dyn StoragePort,
    namespace: &str,
    default: impl FnOnce() -> T,
) -> Loaded<T> {
    let raw = match storage.get(namespace) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("event=store_load module=storage status=skip namespace={namespace} reason=missing");
            return Loaded {
                value: default(),
                source: LoadSource::Missing,
            };
        }
        Err(err) => {
            error!(
                "event=store_load module=storage status=error namespace={namespace} error_code=read_failed error={err}"
            );
            return Loaded {
                value: default(),
                source: LoadSource::Unreadable,
            };
        }
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Loaded {
            value,
            source: LoadSource::Stored,
        },
        Err(err) => {
            warn!(
                "event=store_load module=storage status=fallback namespace={namespace} error_code=corrupt_document line={} column={}",
                err.line(),
                err.column()
            );
            Loaded {
                value: default(),
                source: LoadSource::Corrupt,
            }
        }
    }
}

/// Serializes `document` and writes it as the whole `namespace` value.
pub fn save_document<T: Serialize>(
    storage: &dyn StoragePort,
    namespace: &str,
    document: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string(document).map_err(|source| StorageError::Serialization {
        namespace: namespace.to_string(),
        source,
    })?;
    storage.set(namespace, &raw)
}

#[cfg(test)]
mod tests {
    use super::{load_or_default, save_document, LoadSource};
    use crate::storage::{MemoryStorage, StoragePort};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        items: Vec<u32>,
    }

    fn seed() -> Doc {
        Doc { items: vec![7] }
    }

    #[test]
    fn missing_namespace_uses_default() {
        let storage = MemoryStorage::new();
        let loaded = load_or_default(&storage, "ns", seed);
        assert_eq!(loaded.source, LoadSource::Missing);
        assert_eq!(loaded.value, seed());
    }

    #[test]
    fn saved_document_loads_back() {
        let storage = MemoryStorage::new();
        save_document(&storage, "ns", &Doc { items: vec![1, 2] }).expect("save");
        let loaded = load_or_default(&storage, "ns", seed);
        assert_eq!(loaded.source, LoadSource::Stored);
        assert_eq!(loaded.value.items, vec![1, 2]);
    }

    #[test]
    fn corrupt_document_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage.set("ns", "{not json").expect("set");
        let loaded = load_or_default(&storage, "ns", seed);
        assert_eq!(loaded.source, LoadSource::Corrupt);
        assert!(loaded.source.fell_back());
        assert_eq!(loaded.value, seed());
    }

    #[test]
    fn wrong_shape_is_treated_as_corrupt() {
        let storage = MemoryStorage::new();
        storage.set("ns", r#"{"items":"nope"}"#).expect("set");
        let loaded = load_or_default(&storage, "ns", seed);
        assert_eq!(loaded.source, LoadSource::Corrupt);
    }
}
