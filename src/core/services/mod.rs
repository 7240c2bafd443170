//! Stateless services layered over the ledger store.

pub mod summary_service;
pub mod transfer_service;

pub use summary_service::{LedgerSummary, SummaryService};
pub use transfer_service::TransferService;
