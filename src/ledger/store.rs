use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::utils::persistence::KeyValueStore;
use crate::utils::time::{Clock, SystemClock};

use super::contribution::{Contribution, ContributionDraft, ContributionPatch};

/// Durable key holding the JSON array of contributions.
pub const CONTRIBUTIONS_KEY: &str = "contributions";

/// Owns the authoritative, insertion-ordered set of contributions and writes a
/// full snapshot through to the durable store after every mutation.
pub struct LedgerStore {
    records: Vec<Contribution>,
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
}

impl LedgerStore {
    /// Rehydrates from `storage` using the system clock.
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        Self::with_clock(storage, Box::new(SystemClock))
    }

    /// Rehydrates from `storage`. Absent, unreadable, or corrupt payloads yield an
    /// empty ledger.
    pub fn with_clock(storage: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let records = rehydrate(storage.as_ref());
        tracing::debug!(records = records.len(), "ledger rehydrated");
        Self {
            records,
            storage,
            clock,
        }
    }

    /// Current snapshot in insertion order.
    pub fn snapshot(&self) -> &[Contribution] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reading from the ledger's clock, used to stamp imported rows.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn get(&self, id: Uuid) -> Option<&Contribution> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Display order: newest `created_at` first. Records sharing a timestamp
    /// keep their insertion order.
    pub fn newest_first(&self) -> Vec<&Contribution> {
        newest_first(&self.records)
    }

    /// Case-insensitive name filter, newest first.
    pub fn search(&self, query: &str) -> Vec<&Contribution> {
        let needle = query.trim().to_lowercase();
        self.newest_first()
            .into_iter()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Stamps and appends a draft. A draft breaking the record invariants is
    /// rejected before anything is written.
    pub fn add(&mut self, draft: ContributionDraft) -> Result<Contribution, LedgerError> {
        let record = Contribution::from_draft(draft, self.clock.now());
        record.check()?;
        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next)?;
        tracing::info!(id = %record.id, currency = %record.currency, "contribution added");
        Ok(record)
    }

    /// Merges `patch` over the record. Returns `false` without touching storage
    /// when no record carries `id`; a merge that breaks the record invariants
    /// fails and leaves the ledger as it was.
    pub fn update(&mut self, id: Uuid, patch: &ContributionPatch) -> Result<bool, LedgerError> {
        let Some(index) = self.records.iter().position(|record| record.id == id) else {
            tracing::debug!(%id, "update skipped: unknown id");
            return Ok(false);
        };
        let mut merged = self.records[index].clone();
        patch.apply(&mut merged);
        merged.check()?;
        let mut next = self.records.clone();
        next[index] = merged;
        self.commit(next)?;
        tracing::info!(%id, "contribution updated");
        Ok(true)
    }

    /// Removes the record. Returns `false` when `id` is unknown.
    pub fn delete(&mut self, id: Uuid) -> Result<bool, LedgerError> {
        let next: Vec<Contribution> = self
            .records
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect();
        if next.len() == self.records.len() {
            tracing::debug!(%id, "delete skipped: unknown id");
            return Ok(false);
        }
        self.commit(next)?;
        tracing::info!(%id, "contribution deleted");
        Ok(true)
    }

    /// Appends already-identified records verbatim. Ids are not checked against
    /// the live set, but every record must hold the record invariants or
    /// nothing is appended.
    pub fn import_batch(&mut self, batch: Vec<Contribution>) -> Result<usize, LedgerError> {
        for record in &batch {
            record.check()?;
        }
        let count = batch.len();
        let mut next = self.records.clone();
        next.extend(batch);
        self.commit(next)?;
        tracing::info!(count, total = self.records.len(), "contributions imported");
        Ok(count)
    }

    pub fn clear(&mut self) -> Result<(), LedgerError> {
        let removed = self.records.len();
        self.commit(Vec::new())?;
        tracing::info!(removed, "ledger cleared");
        Ok(())
    }

    /// Writes `next` through and only then makes it the live snapshot, so a
    /// failed write leaves memory matching storage.
    fn commit(&mut self, next: Vec<Contribution>) -> Result<(), LedgerError> {
        let json = serde_json::to_string(&next)?;
        self.storage.set(CONTRIBUTIONS_KEY, &json)?;
        self.records = next;
        Ok(())
    }
}

/// Sorts any snapshot newest first without mutating it.
pub fn newest_first(records: &[Contribution]) -> Vec<&Contribution> {
    let mut ordered: Vec<&Contribution> = records.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered
}

fn rehydrate(storage: &dyn KeyValueStore) -> Vec<Contribution> {
    let raw = match storage.get(CONTRIBUTIONS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(error = %err, "ledger storage unreadable, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(error = %err, "stored ledger is corrupt, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::contribution::{Currency, Field, FieldProblem, Method};
    use crate::utils::persistence::MemoryStore;
    use crate::utils::time::SteppingClock;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Lets a test inspect what the ledger wrote.
    struct SharedStore(Arc<MemoryStore>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
            self.0.set(key, value)
        }
    }

    /// Memory store whose writes can be switched off.
    struct FlakyStore {
        inner: MemoryStore,
        failing: Arc<AtomicBool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(LedgerError::Storage("disk full".into()));
            }
            self.inner.set(key, value)
        }
    }

    fn draft(name: &str, currency: Currency, amount: f64) -> ContributionDraft {
        ContributionDraft {
            name: name.into(),
            method: Method::Cash,
            currency,
            amount,
            remark: String::new(),
        }
    }

    fn store_with_clock() -> (LedgerStore, Arc<MemoryStore>) {
        let backing = Arc::new(MemoryStore::new());
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let store = LedgerStore::with_clock(
            Box::new(SharedStore(backing.clone())),
            Box::new(SteppingClock::new(start, Duration::minutes(1))),
        );
        (store, backing)
    }

    #[test]
    fn update_preserves_identity_and_timestamp() {
        let (mut store, _) = store_with_clock();
        let created = store.add(draft("Sokha", Currency::Usd, 10.0)).unwrap();

        let patch = ContributionPatch {
            name: Some("Sokha K.".into()),
            currency: Some(Currency::Khr),
            amount: Some(40_000.0),
            ..ContributionPatch::default()
        };
        assert!(store.update(created.id, &patch).unwrap());

        let updated = store.get(created.id).expect("record still present");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Sokha K.");
        assert_eq!(updated.currency, Currency::Khr);
        assert_eq!(updated.amount, 40_000.0);
        assert_eq!(updated.method, created.method);
    }

    #[test]
    fn unknown_ids_are_silent_no_ops() {
        let (mut store, _) = store_with_clock();
        store.add(draft("Vanna", Currency::Usd, 5.0)).unwrap();
        let before = store.snapshot().to_vec();

        assert!(!store.delete(Uuid::new_v4()).unwrap());
        assert!(!store
            .update(Uuid::new_v4(), &ContributionPatch::default())
            .unwrap());
        assert_eq!(store.snapshot(), before.as_slice());
    }

    #[test]
    fn every_mutation_writes_through() {
        let (mut store, backing) = store_with_clock();
        let first = store.add(draft("A", Currency::Usd, 1.0)).unwrap();
        store.add(draft("B", Currency::Khr, 4000.0)).unwrap();
        store.delete(first.id).unwrap();

        let persisted: Vec<Contribution> =
            serde_json::from_str(&backing.get(CONTRIBUTIONS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, store.snapshot());

        store.clear().unwrap();
        assert_eq!(
            backing.get(CONTRIBUTIONS_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn corrupt_payload_rehydrates_as_empty() {
        let store = LedgerStore::open(Box::new(MemoryStore::with_value(
            CONTRIBUTIONS_KEY,
            "{not json",
        )));
        assert!(store.is_empty());
    }

    #[test]
    fn import_batch_tolerates_duplicate_ids() {
        let (mut store, _) = store_with_clock();
        let record = store.add(draft("Dup", Currency::Usd, 2.0)).unwrap();
        store.import_batch(vec![record.clone(), record.clone()]).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn newest_first_orders_by_created_at_descending() {
        let (mut store, _) = store_with_clock();
        store.add(draft("oldest", Currency::Usd, 1.0)).unwrap();
        store.add(draft("middle", Currency::Usd, 1.0)).unwrap();
        store.add(draft("newest", Currency::Usd, 1.0)).unwrap();

        let names: Vec<&str> = store
            .newest_first()
            .iter()
            .map(|record| record.name.as_str())
            .collect();
        assert_eq!(names, ["newest", "middle", "oldest"]);
        assert_eq!(store.snapshot()[0].name, "oldest");
    }

    #[test]
    fn search_matches_names_case_insensitively() {
        let (mut store, _) = store_with_clock();
        store.add(draft("Chan Dara", Currency::Usd, 1.0)).unwrap();
        store.add(draft("Sophea", Currency::Usd, 1.0)).unwrap();
        let hits = store.search("dara");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Chan Dara");
    }

    #[test]
    fn invalid_drafts_and_patches_are_rejected_without_writing() {
        let (mut store, backing) = store_with_clock();
        let kept = store.add(draft("Kept", Currency::Usd, 5.0)).unwrap();
        let written = backing.get(CONTRIBUTIONS_KEY).unwrap();

        let err = store.add(draft("Negative", Currency::Usd, -3.0)).unwrap_err();
        assert!(matches!(err, LedgerError::Invalid(_)));
        assert!(store.add(draft("  ", Currency::Usd, 1.0)).is_err());
        assert!(store.add(draft("Fraction", Currency::Khr, 0.4)).is_err());

        let nan = ContributionPatch {
            amount: Some(f64::NAN),
            ..ContributionPatch::default()
        };
        match store.update(kept.id, &nan) {
            Err(LedgerError::Invalid(errors)) => {
                assert_eq!(errors.get(Field::Amount), Some(FieldProblem::InvalidAmount))
            }
            other => panic!("expected invalid record, got {other:?}"),
        }
        let blank = ContributionPatch {
            name: Some(String::new()),
            ..ContributionPatch::default()
        };
        assert!(store.update(kept.id, &blank).is_err());

        assert_eq!(store.snapshot(), [kept]);
        assert_eq!(backing.get(CONTRIBUTIONS_KEY).unwrap(), written);
        let reopened = LedgerStore::open(Box::new(SharedStore(backing)));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn import_batch_rejects_any_invalid_record() {
        let (mut store, _) = store_with_clock();
        let good = store.add(draft("Good", Currency::Usd, 2.0)).unwrap();
        let mut bad = good.clone();
        bad.amount = f64::INFINITY;
        assert!(store.import_batch(vec![good.clone(), bad]).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_writes_leave_memory_unchanged() {
        let failing = Arc::new(AtomicBool::new(false));
        let mut store = LedgerStore::open(Box::new(FlakyStore {
            inner: MemoryStore::new(),
            failing: failing.clone(),
        }));
        let first = store.add(draft("First", Currency::Usd, 1.0)).unwrap();
        let before = store.snapshot().to_vec();

        failing.store(true, Ordering::SeqCst);
        assert!(store.add(draft("Second", Currency::Usd, 2.0)).is_err());
        let patch = ContributionPatch {
            amount: Some(9.0),
            ..ContributionPatch::default()
        };
        assert!(store.update(first.id, &patch).is_err());
        assert!(store.delete(first.id).is_err());
        assert!(store.import_batch(vec![first.clone()]).is_err());
        assert!(store.clear().is_err());
        assert_eq!(store.snapshot(), before.as_slice());

        failing.store(false, Ordering::SeqCst);
        assert!(store.delete(first.id).unwrap());
        assert!(store.is_empty());
    }
}
