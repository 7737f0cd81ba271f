//! Pure insert-or-update-if-newer merge keyed by remote id.

use crate::model::{LocalId, SyncRecord};
use log::warn;
use std::collections::HashMap;

/// Counts produced by one `merge_remote` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Incoming records without a remote id.
    pub skipped: usize,
}

impl UpsertReport {
    /// Whether the merge produced a different collection.
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.updated > 0
    }
}

/// Merges remote records into `current`.
///
/// - Matching `boost_space_id`: fields replaced only when the incoming
///   `updated_at` is strictly newer; the local id is kept.
/// - No match: appended under a fresh local id from `fresh_id`.
/// - Records in `current` that are absent from `incoming` are kept as-is.
///
/// Incoming duplicates of one remote id collapse into a single local record.
pub fn merge_remote<T: SyncRecord>(
    current: &[T],
    incoming: Vec<T>,
    mut fresh_id: impl FnMut() -> LocalId,
) -> (Vec<T>, UpsertReport) {
    let mut records = current.to_vec();
    let mut by_remote_id: HashMap<String, usize> = records
        .iter()
        .enumerate()
        .filter_map(|(pos, record)| record.boost_space_id().map(|id| (id.to_string(), pos)))
        .collect();
    let mut report = UpsertReport::default();

    for record in incoming {
        let Some(remote_id) = record.boost_space_id().map(str::to_string) else {
            warn!(
                "event=upsert module=store status=skip reason=missing_remote_id local_id={}",
                record.local_id()
            );
            report.skipped += 1;
            continue;
        };

        match by_remote_id.get(&remote_id).and_then(|pos| records.get_mut(*pos)) {
            Some(existing) => {
                if record.updated_at() > existing.updated_at() {
                    existing.absorb_remote(record);
                    report.updated += 1;
                } else {
                    report.unchanged += 1;
                }
            }
            None => {
                let mut local_id = fresh_id();
                while local_id.to_string() == remote_id {
                    local_id = fresh_id();
                }
                by_remote_id.insert(remote_id, records.len());
                records.push(record.with_local_id(local_id));
                report.inserted += 1;
            }
        }
    }

    (records, report)
}

#[cfg(test)]
mod tests {
    use super::merge_remote;
    use crate::model::note::Note;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn note(id: u128, remote: Option<&str>, content: &str, minutes: i64) -> Note {
        Note {
            id: Uuid::from_u128(id),
            title: format!("note {id}"),
            content: content.to_string(),
            tags: vec![],
            created_at: at(0),
            updated_at: at(minutes),
            boost_space_id: remote.map(str::to_string),
        }
    }

    fn counter() -> impl FnMut() -> Uuid {
        let mut next = 1000u128;
        move || {
            next += 1;
            Uuid::from_u128(next)
        }
    }

    #[test]
    fn newer_remote_record_replaces_fields_but_keeps_local_id() {
        let current = vec![note(1, Some("bs_a"), "old", 1)];
        let incoming = vec![note(77, Some("bs_a"), "new", 2)];
        let (merged, report) = merge_remote(&current, incoming, counter());

        assert_eq!(report.updated, 1);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, Uuid::from_u128(1));
        assert_eq!(merged[0].content, "new");
    }

    #[test]
    fn equal_or_older_remote_record_is_ignored() {
        let current = vec![note(1, Some("bs_a"), "local", 5)];
        let incoming = vec![
            note(2, Some("bs_a"), "same time", 5),
            note(3, Some("bs_a"), "older", 4),
        ];
        let (merged, report) = merge_remote(&current, incoming, counter());

        assert_eq!(report.unchanged, 2);
        assert!(!report.changed());
        assert_eq!(merged[0].content, "local");
    }

    #[test]
    fn unknown_remote_record_is_appended_with_fresh_local_id() {
        let current = vec![note(1, None, "local only", 1)];
        let incoming = vec![note(9, Some("bs_new"), "remote", 1)];
        let (merged, report) = merge_remote(&current, incoming, counter());

        assert_eq!(report.inserted, 1);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, Uuid::from_u128(1));
        assert_eq!(merged[1].id, Uuid::from_u128(1001));
        assert_eq!(merged[1].boost_space_id.as_deref(), Some("bs_new"));
    }

    #[test]
    fn duplicate_incoming_remote_ids_collapse_to_one_record() {
        let incoming = vec![
            note(9, Some("bs_x"), "first", 1),
            note(10, Some("bs_x"), "second", 2),
        ];
        let (merged, report) = merge_remote(&[], incoming, counter());

        assert_eq!(merged.len(), 1);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(merged[0].content, "second");
    }

    #[test]
    fn records_without_remote_id_are_skipped() {
        let (merged, report) = merge_remote(&[], vec![note(3, None, "x", 1)], counter());
        assert!(merged.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn applying_the_same_batch_twice_is_idempotent() {
        let incoming = vec![note(9, Some("bs_a"), "remote", 3)];
        let (first, _) = merge_remote(&[], incoming.clone(), counter());
        let (second, report) = merge_remote(&first, incoming, counter());

        assert_eq!(first, second);
        assert!(!report.changed());
    }
}
