use crate::csv;
use crate::errors::LedgerError;
use crate::ledger::LedgerStore;
use crate::notify::{Notifier, Severity};
use crate::report::strings::StringTable;

/// Bulk ledger operations that report their outcome through a [`Notifier`].
pub struct TransferService {
    strings: StringTable,
}

impl TransferService {
    pub fn new(strings: StringTable) -> Self {
        Self { strings }
    }

    pub fn export_csv(&self, store: &LedgerStore) -> String {
        csv::export(store.snapshot())
    }

    /// Parses `text` and appends every row in one batch.
    ///
    /// A malformed file leaves the ledger untouched, raises exactly one error
    /// notification and yields `Ok(0)`. Only a failed storage write is an `Err`.
    pub fn import_csv(
        &self,
        store: &mut LedgerStore,
        text: &str,
        notifier: &dyn Notifier,
    ) -> Result<usize, LedgerError> {
        let batch = match csv::parse(text, store.now()) {
            Ok(batch) => batch,
            Err(err) => {
                tracing::warn!(error = %err, "CSV import rejected");
                notifier.notify(&format!("{}: {err}", self.strings.csv_error), Severity::Error);
                return Ok(0);
            }
        };
        let count = store.import_batch(batch)?;
        notifier.notify(
            &format!("{} ({count})", self.strings.csv_imported),
            Severity::Success,
        );
        Ok(count)
    }

    /// Empties the ledger. Does nothing, and notifies nobody, when it is already empty.
    pub fn clear_all(
        &self,
        store: &mut LedgerStore,
        notifier: &dyn Notifier,
    ) -> Result<(), LedgerError> {
        if store.is_empty() {
            return Ok(());
        }
        store.clear()?;
        notifier.notify(&self.strings.all_cleared, Severity::Success);
        Ok(())
    }
}
