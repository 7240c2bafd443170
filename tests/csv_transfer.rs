mod common;

use std::time::Duration;

use common::{data_dir, draft, open_store, RecordingNotifier};
use contribution_ledger::{
    core::services::TransferService,
    csv::{self, CsvErrorKind},
    ledger::{Currency, Method},
    notify::{NotificationQueue, Severity},
    report::strings::{BuiltinTranslations, Locale, Translations},
};

fn service() -> TransferService {
    TransferService::new(BuiltinTranslations.table(Locale::En))
}

#[test]
fn export_import_round_trip_preserves_fields_but_not_ids() {
    let source_dir = data_dir();
    let mut source = open_store(&source_dir);
    source
        .add(draft("Chan, Dara", Method::Khqr, Currency::Usd, 12.5))
        .unwrap();
    let mut with_remark = draft("Sophea", Method::Cash, Currency::Khr, 4100.0);
    with_remark.remark = "for the temple".into();
    source.add(with_remark).unwrap();

    let text = service().export_csv(&source);
    assert!(text.starts_with("\"Name\",\"Method\",\"Currency\",\"Amount\",\"Remark\",\"Date\"\n"));

    let target_dir = data_dir();
    let mut target = open_store(&target_dir);
    let notifier = RecordingNotifier::default();
    let imported = service().import_csv(&mut target, &text, &notifier).unwrap();

    assert_eq!(imported, 2);
    assert_eq!(notifier.severities(), [Severity::Success]);
    for (original, copy) in source.snapshot().iter().zip(target.snapshot()) {
        assert_ne!(original.id, copy.id);
        assert_eq!(original.name, copy.name);
        assert_eq!(original.method, copy.method);
        assert_eq!(original.currency, copy.currency);
        assert_eq!(original.amount, copy.amount);
        assert_eq!(original.remark, copy.remark);
        assert_eq!(original.created_at, copy.created_at);
    }
}

#[test]
fn malformed_file_imports_nothing_and_reports_once() {
    let dir = data_dir();
    let mut store = open_store(&dir);
    store
        .add(draft("Existing", Method::Cash, Currency::Usd, 1.0))
        .unwrap();
    let before = store.snapshot().to_vec();

    let text = "Name,Method,Currency,Amount,Remark,Date\n\
                Good,Cash,USD,3,,\n\
                Bad,Cash,USD,0,,\n\
                Also good,KHQR,KHR,500,,\n";
    let notifier = RecordingNotifier::default();
    let imported = service().import_csv(&mut store, text, &notifier).unwrap();

    assert_eq!(imported, 0);
    assert_eq!(store.snapshot(), before.as_slice());
    assert_eq!(notifier.severities(), [Severity::Error]);
    assert!(notifier.messages.borrow()[0].0.contains("line 3"));
}

#[test]
fn parse_reports_the_failing_line() {
    let err = csv::parse("h\n\n\"ok\",\"Cash\",\"USD\",\"1\"\n\"x\",\"Card\",\"USD\",\"1\"\n", common::start_instant())
        .unwrap_err();
    assert_eq!(err.line, 4);
    assert_eq!(err.kind, CsvErrorKind::InvalidMethod("Card".into()));
    assert_eq!(err.to_string(), "CSV line 4: unknown payment method `Card`");
}

#[tokio::test(start_paused = true)]
async fn failed_import_notification_expires_on_its_own() {
    let dir = data_dir();
    let mut store = open_store(&dir);
    let queue = NotificationQueue::new();

    service()
        .import_csv(&mut store, "h\n\"unterminated,Cash,USD,1\n", &queue)
        .unwrap();
    let entries = queue.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::Error);

    tokio::time::sleep(Duration::from_millis(3001)).await;
    assert!(queue.is_empty());
    assert_eq!(queue.expired_count(), 1);
}
