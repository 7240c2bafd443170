mod common;

use common::{data_dir, draft, open_store};
use contribution_ledger::{
    errors::LedgerError,
    ledger::{ContributionPatch, Currency, LedgerStore, Method, CONTRIBUTIONS_KEY},
    utils::persistence::{JsonFileStore, KeyValueStore},
};

#[test]
fn records_survive_a_restart() {
    let dir = data_dir();
    let (first, second) = {
        let mut store = open_store(&dir);
        let first = store
            .add(draft("Dara", Method::Khqr, Currency::Usd, 12.5))
            .unwrap();
        let second = store
            .add(draft("Sokha", Method::Cash, Currency::Khr, 40_000.0))
            .unwrap();
        (first, second)
    };

    let reopened = open_store(&dir);
    assert_eq!(reopened.snapshot(), [first, second.clone()]);
    assert_eq!(reopened.newest_first()[0].id, second.id);
}

#[test]
fn update_and_delete_write_through_to_disk() {
    let dir = data_dir();
    let mut store = open_store(&dir);
    let kept = store
        .add(draft("Vanna", Method::Cash, Currency::Usd, 5.0))
        .unwrap();
    let removed = store
        .add(draft("Temp", Method::Cash, Currency::Usd, 1.0))
        .unwrap();

    let patch = ContributionPatch {
        amount: Some(7.25),
        remark: Some("late".into()),
        ..ContributionPatch::default()
    };
    assert!(store.update(kept.id, &patch).unwrap());
    assert!(store.delete(removed.id).unwrap());
    drop(store);

    let reopened = open_store(&dir);
    assert_eq!(reopened.len(), 1);
    let record = reopened.get(kept.id).unwrap();
    assert_eq!(record.amount, 7.25);
    assert_eq!(record.remark, "late");
    assert_eq!(record.created_at, kept.created_at);
}

#[test]
fn corrupt_file_starts_an_empty_ledger_that_can_recover() {
    let dir = data_dir();
    let files = JsonFileStore::new(dir.path()).unwrap();
    std::fs::write(files.path_for(CONTRIBUTIONS_KEY), "[{\"truncated\":").unwrap();

    let mut store = LedgerStore::open(Box::new(files.clone()));
    assert!(store.is_empty());

    store
        .add(draft("Fresh", Method::Khqr, Currency::Usd, 2.0))
        .unwrap();
    let raw = files.get(CONTRIBUTIONS_KEY).unwrap().unwrap();
    assert!(raw.contains("\"Fresh\""));
}

#[test]
fn stored_records_use_camel_case_fields() {
    let dir = data_dir();
    let mut store = open_store(&dir);
    store
        .add(draft("Dara", Method::Khqr, Currency::Khr, 4100.0))
        .unwrap();

    let files = JsonFileStore::new(dir.path()).unwrap();
    let raw = files.get(CONTRIBUTIONS_KEY).unwrap().unwrap();
    assert!(raw.contains("\"createdAt\""));
    assert!(raw.contains("\"method\":\"KHQR\""));
    assert!(raw.contains("\"currency\":\"KHR\""));
}

#[test]
fn rejected_values_never_reach_the_file() {
    let dir = data_dir();
    let mut store = open_store(&dir);
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        ids.push(
            store
                .add(draft(name, Method::Cash, Currency::Usd, 1.0))
                .unwrap()
                .id,
        );
    }

    let nan = ContributionPatch {
        amount: Some(f64::NAN),
        ..ContributionPatch::default()
    };
    assert!(matches!(
        store.update(ids[1], &nan),
        Err(LedgerError::Invalid(_))
    ));
    assert!(matches!(
        store.add(draft("D", Method::Cash, Currency::Usd, -3.0)),
        Err(LedgerError::Invalid(_))
    ));
    assert!(store
        .add(draft("E", Method::Cash, Currency::Khr, 4100.6))
        .is_err());
    drop(store);

    let reopened = open_store(&dir);
    assert_eq!(reopened.len(), 3);
    assert!(reopened.snapshot().iter().all(|record| record.amount == 1.0));
}
