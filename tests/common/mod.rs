#![allow(dead_code)]

use std::cell::RefCell;

use chrono::{DateTime, Duration, TimeZone, Utc};
use contribution_ledger::{
    ledger::{ContributionDraft, Currency, LedgerStore, Method},
    notify::{Notifier, Severity},
    utils::{persistence::JsonFileStore, time::SteppingClock},
};
use tempfile::TempDir;

/// A scratch data directory; dropping it removes every file the test wrote.
pub fn data_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap()
}

/// File-backed ledger whose clock advances one minute per record.
pub fn open_store(dir: &TempDir) -> LedgerStore {
    let storage = JsonFileStore::new(dir.path()).expect("open json store");
    LedgerStore::with_clock(
        Box::new(storage),
        Box::new(SteppingClock::new(start_instant(), Duration::minutes(1))),
    )
}

pub fn draft(name: &str, method: Method, currency: Currency, amount: f64) -> ContributionDraft {
    ContributionDraft {
        name: name.to_string(),
        method,
        currency,
        amount,
        remark: String::new(),
    }
}

/// Notifier that keeps every message for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn severities(&self) -> Vec<Severity> {
        self.messages.borrow().iter().map(|(_, s)| *s).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .borrow_mut()
            .push((message.to_string(), severity));
    }
}
