use std::collections::HashMap;

use serde::Serialize;

use crate::currency::ranking_units;
use crate::ledger::{Contribution, Currency, Method};

/// Number of contributors shown in the ranked chart.
pub const TOP_CONTRIBUTORS: usize = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodCounts {
    pub khqr: usize,
    pub cash: usize,
}

impl MethodCounts {
    pub fn get(&self, method: Method) -> usize {
        match method {
            Method::Khqr => self.khqr,
            Method::Cash => self.cash,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyCounts {
    pub usd: usize,
    pub khr: usize,
}

impl CurrencyCounts {
    pub fn total(&self) -> usize {
        self.usd + self.khr
    }
}

/// Per-currency sums. The two figures are never combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CurrencyTotals {
    pub usd: f64,
    pub khr: f64,
}

impl CurrencyTotals {
    pub fn get(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd,
            Currency::Khr => self.khr,
        }
    }
}

/// A contributor's separate USD and KHR sums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorTotal {
    pub name: String,
    pub usd: f64,
    pub khr: f64,
}

impl ContributorTotal {
    /// Ordering key in USD-equivalent units. Never shown as an amount.
    pub fn score(&self) -> f64 {
        ranking_units(self.usd, Currency::Usd) + ranking_units(self.khr, Currency::Khr)
    }
}

/// Everything the report's summary cards need.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub participants: usize,
    pub methods: MethodCounts,
    pub currencies: CurrencyCounts,
    pub totals: CurrencyTotals,
}

/// Pure aggregation over a ledger snapshot, recomputed on every call.
pub struct SummaryService;

impl SummaryService {
    pub fn method_counts(snapshot: &[Contribution]) -> MethodCounts {
        snapshot
            .iter()
            .fold(MethodCounts::default(), |mut counts, record| {
                match record.method {
                    Method::Khqr => counts.khqr += 1,
                    Method::Cash => counts.cash += 1,
                }
                counts
            })
    }

    pub fn currency_counts(snapshot: &[Contribution]) -> CurrencyCounts {
        snapshot
            .iter()
            .fold(CurrencyCounts::default(), |mut counts, record| {
                match record.currency {
                    Currency::Usd => counts.usd += 1,
                    Currency::Khr => counts.khr += 1,
                }
                counts
            })
    }

    pub fn currency_totals(snapshot: &[Contribution]) -> CurrencyTotals {
        snapshot
            .iter()
            .fold(CurrencyTotals::default(), |mut totals, record| {
                match record.currency {
                    Currency::Usd => totals.usd += record.amount,
                    Currency::Khr => totals.khr += record.amount,
                }
                totals
            })
    }

    /// Every contributor, highest score first. Equal scores keep the order in
    /// which the names first appear in the snapshot.
    pub fn contributor_ranking(snapshot: &[Contribution]) -> Vec<ContributorTotal> {
        let mut ranking: Vec<ContributorTotal> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        for record in snapshot {
            let position = *slots.entry(record.name.as_str()).or_insert_with(|| {
                ranking.push(ContributorTotal {
                    name: record.name.clone(),
                    usd: 0.0,
                    khr: 0.0,
                });
                ranking.len() - 1
            });
            let entry = &mut ranking[position];
            match record.currency {
                Currency::Usd => entry.usd += record.amount,
                Currency::Khr => entry.khr += record.amount,
            }
        }
        // `sort_by` is stable, which keeps first-appearance order on ties.
        ranking.sort_by(|a, b| b.score().total_cmp(&a.score()));
        ranking
    }

    pub fn top_contributors(snapshot: &[Contribution], limit: usize) -> Vec<ContributorTotal> {
        let mut ranking = Self::contributor_ranking(snapshot);
        ranking.truncate(limit);
        ranking
    }

    pub fn summarize(snapshot: &[Contribution]) -> LedgerSummary {
        LedgerSummary {
            participants: snapshot.len(),
            methods: Self::method_counts(snapshot),
            currencies: Self::currency_counts(snapshot),
            totals: Self::currency_totals(snapshot),
        }
    }
}
