//! Contribution records, form validation, and the persisted ledger store.

pub mod contribution;
pub mod store;

pub use contribution::{
    Contribution, ContributionDraft, ContributionForm, ContributionPatch, Currency, Field,
    FieldErrors, FieldProblem, Method,
};
pub use store::{newest_first, LedgerStore, CONTRIBUTIONS_KEY};
