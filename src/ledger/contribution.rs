use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::fits_minor_units;

/// Payment channel a contribution arrived through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Method {
    #[serde(rename = "KHQR")]
    Khqr,
    Cash,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Khqr => "KHQR",
            Method::Cash => "Cash",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            v if v.eq_ignore_ascii_case("KHQR") => Ok(Method::Khqr),
            v if v.eq_ignore_ascii_case("Cash") => Ok(Method::Cash),
            other => Err(format!("unknown payment method `{other}`")),
        }
    }
}

/// The two currencies a contribution can be recorded in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "KHR")]
    Khr,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Khr => "KHR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            v if v.eq_ignore_ascii_case("USD") => Ok(Currency::Usd),
            v if v.eq_ignore_ascii_case("KHR") => Ok(Currency::Khr),
            other => Err(format!("unknown currency `{other}`")),
        }
    }
}

/// One recorded payment event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: Uuid,
    pub name: String,
    pub method: Method,
    pub currency: Currency,
    pub amount: f64,
    #[serde(default)]
    pub remark: String,
    pub created_at: DateTime<Utc>,
}

impl Contribution {
    /// Materializes a validated draft with a fresh identifier.
    pub fn from_draft(draft: ContributionDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            method: draft.method,
            currency: draft.currency,
            amount: draft.amount,
            remark: draft.remark,
            created_at,
        }
    }

    /// Checks what every stored record must hold: a non-blank name and a
    /// positive finite amount expressible in the currency's smallest unit.
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push((Field::Name, FieldProblem::Required));
        }
        if let Some(problem) = amount_problem(self.amount, self.currency) {
            errors.push((Field::Amount, problem));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FieldErrors(errors))
        }
    }

    /// `None` when the remark is blank.
    pub fn remark(&self) -> Option<&str> {
        let trimmed = self.remark.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// A contribution that passed validation but has no id or timestamp yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionDraft {
    pub name: String,
    pub method: Method,
    pub currency: Currency,
    pub amount: f64,
    pub remark: String,
}

/// Partial update merged over an existing record; `id` and `created_at` are
/// never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionPatch {
    pub name: Option<String>,
    pub method: Option<Method>,
    pub currency: Option<Currency>,
    pub amount: Option<f64>,
    pub remark: Option<String>,
}

impl ContributionPatch {
    pub fn apply(&self, target: &mut Contribution) {
        if let Some(name) = &self.name {
            target.name = name.clone();
        }
        if let Some(method) = self.method {
            target.method = method;
        }
        if let Some(currency) = self.currency {
            target.currency = currency;
        }
        if let Some(amount) = self.amount {
            target.amount = amount;
        }
        if let Some(remark) = &self.remark {
            target.remark = remark.clone();
        }
    }
}

impl From<ContributionDraft> for ContributionPatch {
    fn from(draft: ContributionDraft) -> Self {
        Self {
            name: Some(draft.name),
            method: Some(draft.method),
            currency: Some(draft.currency),
            amount: Some(draft.amount),
            remark: Some(draft.remark),
        }
    }
}

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Method,
    Currency,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Required,
    InvalidAmount,
    TooPrecise,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Required => f.write_str("this field is required"),
            FieldProblem::InvalidAmount => f.write_str("amount must be greater than zero"),
            FieldProblem::TooPrecise => {
                f.write_str("KHR amounts must be whole riel and USD amounts whole cents")
            }
        }
    }
}

/// Per-field validation outcome; every failing field is reported at once.
#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("invalid contribution: {}", describe(.0))]
pub struct FieldErrors(pub Vec<(Field, FieldProblem)>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<FieldProblem> {
        self.0
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, problem)| *problem)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn describe(errors: &[(Field, FieldProblem)]) -> String {
    errors
        .iter()
        .map(|(field, problem)| format!("{field:?}: {problem}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw, unvalidated user input for creating or editing a contribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionForm {
    pub name: String,
    pub method: Option<Method>,
    pub currency: Option<Currency>,
    pub amount: String,
    pub remark: String,
}

impl ContributionForm {
    pub fn validate(&self) -> Result<ContributionDraft, FieldErrors> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push((Field::Name, FieldProblem::Required));
        }
        if self.method.is_none() {
            errors.push((Field::Method, FieldProblem::Required));
        }
        if self.currency.is_none() {
            errors.push((Field::Currency, FieldProblem::Required));
        }
        let amount = parse_positive_amount(&self.amount);
        match (amount, self.currency) {
            (None, _) => errors.push((Field::Amount, FieldProblem::InvalidAmount)),
            (Some(value), Some(currency)) if !fits_minor_units(value, currency) => {
                errors.push((Field::Amount, FieldProblem::TooPrecise))
            }
            _ => {}
        }

        match (self.method, self.currency, amount) {
            (Some(method), Some(currency), Some(amount)) if errors.is_empty() => {
                Ok(ContributionDraft {
                    name: name.to_string(),
                    method,
                    currency,
                    amount,
                    remark: self.remark.trim().to_string(),
                })
            }
            _ => Err(FieldErrors(errors)),
        }
    }
}

impl From<&Contribution> for ContributionForm {
    fn from(existing: &Contribution) -> Self {
        Self {
            name: existing.name.clone(),
            method: Some(existing.method),
            currency: Some(existing.currency),
            amount: existing.amount.to_string(),
            remark: existing.remark.clone(),
        }
    }
}

fn amount_problem(amount: f64, currency: Currency) -> Option<FieldProblem> {
    if !amount.is_finite() || amount <= 0.0 {
        Some(FieldProblem::InvalidAmount)
    } else if !fits_minor_units(amount, currency) {
        Some(FieldProblem::TooPrecise)
    } else {
        None
    }
}

/// Parses a strictly positive, finite amount.
pub fn parse_positive_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}
