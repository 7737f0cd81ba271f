//! Persisted record collection shared by the note and proposal stores.

use crate::clock::Clock;
use crate::model::{new_local_id, LocalId, SyncRecord};
use crate::storage::{load_or_default, save_document, LoadSource, StoragePort};
use crate::store::merge::{merge_remote, UpsertReport};
use crate::store::{StoreError, StoreResult};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Namespace document wrapping one record list.
pub(crate) trait CollectionDocument: Serialize + DeserializeOwned {
    type Record: SyncRecord;

    const NAMESPACE: &'static str;
    /// Record kind used in errors and log lines.
    const KIND: &'static str;

    fn from_records(records: Vec<Self::Record>) -> Self;
    fn into_records(self) -> Vec<Self::Record>;
}

pub(crate) struct Collection<D: CollectionDocument> {
    storage: Arc<dyn StoragePort>,
    clock: Arc<dyn Clock>,
    records: Vec<D::Record>,
    load_source: LoadSource,
}

impl<D: CollectionDocument> Collection<D> {
    pub(crate) fn load(storage: Arc<dyn StoragePort>, clock: Arc<dyn Clock>) -> Self {
        let loaded = load_or_default(storage.as_ref(), D::NAMESPACE, || {
            D::from_records(Vec::new())
        });
        Self {
            storage,
            clock,
            records: loaded.value.into_records(),
            load_source: loaded.source,
        }
    }

    pub(crate) fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub(crate) fn records(&self) -> &[D::Record] {
        &self.records
    }

    pub(crate) fn get(&self, id: LocalId) -> Option<&D::Record> {
        self.records.iter().find(|record| record.local_id() == id)
    }

    pub(crate) fn unsynced(&self) -> Vec<D::Record> {
        self.records
            .iter()
            .filter(|record| record.boost_space_id().is_none())
            .cloned()
            .collect()
    }

    pub(crate) fn known_boost_space_ids(&self) -> HashSet<String> {
        self.records
            .iter()
            .filter_map(|record| record.boost_space_id().map(str::to_string))
            .collect()
    }

    /// Prepends a new record.
    pub(crate) fn prepend(&mut self, record: D::Record) -> StoreResult<D::Record> {
        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record.clone());
        next.extend(self.records.iter().cloned());
        self.commit(next)?;
        Ok(record)
    }

    /// Applies `edit` to the record with `id` and persists the result.
    pub(crate) fn modify(
        &mut self,
        id: LocalId,
        edit: impl FnOnce(&mut D::Record),
    ) -> StoreResult<D::Record> {
        let pos = self.position(id)?;
        let mut next = self.records.clone();
        let record = &mut next[pos];
        edit(record);
        let updated = record.clone();
        self.commit(next)?;
        Ok(updated)
    }

    pub(crate) fn remove(&mut self, id: LocalId) -> StoreResult<D::Record> {
        let pos = self.position(id)?;
        let mut next = self.records.clone();
        let removed = next.remove(pos);
        self.commit(next)?;
        Ok(removed)
    }

    pub(crate) fn upsert(&mut self, incoming: Vec<D::Record>) -> StoreResult<UpsertReport> {
        let (next, report) = merge_remote(&self.records, incoming, new_local_id);
        if report.changed() {
            self.commit(next)?;
        }
        info!(
            "event=upsert module=store status=ok kind={} inserted={} updated={} unchanged={} skipped={}",
            D::KIND,
            report.inserted,
            report.updated,
            report.unchanged,
            report.skipped
        );
        Ok(report)
    }

    pub(crate) fn clear(&mut self) -> StoreResult<()> {
        self.storage.remove(D::NAMESPACE)?;
        self.records.clear();
        Ok(())
    }

    fn position(&self, id: LocalId) -> StoreResult<usize> {
        self.records
            .iter()
            .position(|record| record.local_id() == id)
            .ok_or(StoreError::NotFound { kind: D::KIND, id })
    }

    fn commit(&mut self, next: Vec<D::Record>) -> StoreResult<()> {
        let document = D::from_records(next);
        save_document(self.storage.as_ref(), D::NAMESPACE, &document)?;
        self.records = document.into_records();
        Ok(())
    }
}
