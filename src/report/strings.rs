use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::Method;

/// The two supported interface languages.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Km,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Km => "km",
        }
    }

    pub fn toggled(&self) -> Locale {
        match self {
            Locale::En => Locale::Km,
            Locale::Km => Locale::En,
        }
    }

    /// Long date used in the report header.
    pub fn format_long_date(&self, instant: DateTime<Utc>) -> String {
        match self {
            Locale::En => instant.format("%B %-d, %Y").to_string(),
            Locale::Km => instant.format("%-d/%-m/%Y").to_string(),
        }
    }

    /// Short date used in listing rows.
    pub fn format_short_date(&self, instant: DateTime<Utc>) -> String {
        match self {
            Locale::En => instant.format("%-m/%-d/%Y").to_string(),
            Locale::Km => instant.format("%-d/%-m/%Y").to_string(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Locale::En),
            "km" | "km-kh" | "khmer" => Ok(Locale::Km),
            other => Err(format!("unsupported locale `{other}`")),
        }
    }
}

/// Every user-facing string the core substitutes into reports and messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StringTable {
    pub title: String,
    pub subtitle: String,
    pub report_label: String,
    pub generated: String,
    pub usd_total: String,
    pub khr_total: String,
    pub participants: String,
    pub charts_title: String,
    pub payment_breakdown: String,
    pub currency_distribution: String,
    pub top_contributors: String,
    pub usd_equivalent: String,
    pub records_title: String,
    pub no_data: String,
    pub col_no: String,
    pub col_name: String,
    pub col_method: String,
    pub col_amount: String,
    pub col_remark: String,
    pub col_date: String,
    pub khqr: String,
    pub cash: String,
    pub dollar: String,
    pub riel: String,
    pub csv_imported: String,
    pub csv_error: String,
    pub all_cleared: String,
    pub saved: String,
    pub updated: String,
    pub deleted: String,
}

impl StringTable {
    pub fn method_label(&self, method: Method) -> &str {
        match method {
            Method::Khqr => &self.khqr,
            Method::Cash => &self.cash,
        }
    }
}

/// Source of localized strings. The host can plug in its own tables.
pub trait Translations {
    fn table(&self, locale: Locale) -> StringTable;
}

/// English and Khmer tables shipped with the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTranslations;

impl Translations for BuiltinTranslations {
    fn table(&self, locale: Locale) -> StringTable {
        match locale {
            Locale::En => english(),
            Locale::Km => khmer(),
        }
    }
}

fn english() -> StringTable {
    StringTable {
        title: "Money Collection".into(),
        subtitle: "Admin Dashboard".into(),
        report_label: "Contribution Report".into(),
        generated: "Generated on".into(),
        usd_total: "Total Collected (USD)".into(),
        khr_total: "Total Collected (KHR)".into(),
        participants: "Total Participants".into(),
        charts_title: "Data Overview".into(),
        payment_breakdown: "Payment Method Breakdown".into(),
        currency_distribution: "Currency Distribution".into(),
        top_contributors: "Top Contributors".into(),
        usd_equivalent: "USD equivalent".into(),
        records_title: "Contribution Records".into(),
        no_data: "No contributions recorded.".into(),
        col_no: "#".into(),
        col_name: "Name".into(),
        col_method: "Method".into(),
        col_amount: "Amount".into(),
        col_remark: "Remark".into(),
        col_date: "Date".into(),
        khqr: "KHQR".into(),
        cash: "Cash".into(),
        dollar: "Dollar".into(),
        riel: "Riel".into(),
        csv_imported: "CSV imported successfully".into(),
        csv_error: "Could not read the CSV file".into(),
        all_cleared: "All records cleared".into(),
        saved: "Contribution saved".into(),
        updated: "Contribution updated".into(),
        deleted: "Contribution deleted".into(),
    }
}

fn khmer() -> StringTable {
    StringTable {
        title: "ប្រព័ន្ធកត់ត្រាប្រាក់".into(),
        subtitle: "ផ្ទាំងគ្រប់គ្រង".into(),
        report_label: "របាយការណ៍ការចូលរួម".into(),
        generated: "បានបង្កើតនៅ".into(),
        usd_total: "ប្រាក់សរុប (ដុល្លា)".into(),
        khr_total: "ប្រាក់សរុប (រៀល)".into(),
        participants: "ចំនួនអ្នកចូលរួម".into(),
        charts_title: "ការវិភាគទិន្នន័យ".into(),
        payment_breakdown: "វិធីសាស្ត្រទទួលប្រាក់".into(),
        currency_distribution: "ប្រភេទរូបិយប័ណ្ណ".into(),
        top_contributors: "អ្នកចូលរួមច្រើនជាងគេ".into(),
        usd_equivalent: "សមមូលដុល្លារ".into(),
        records_title: "បញ្ជីអ្នកចូលរួម".into(),
        no_data: "មិនទាន់មានការចូលរួម".into(),
        col_no: "លរ".into(),
        col_name: "ឈ្មោះ".into(),
        col_method: "វិធីសាស្ត្រ".into(),
        col_amount: "ចំនួន".into(),
        col_remark: "កំណត់សម្គាល់".into(),
        col_date: "កាលបរិច្ឆេទ".into(),
        khqr: "KHQR".into(),
        cash: "សាច់ប្រាក់".into(),
        dollar: "ដុល្លារ".into(),
        riel: "រៀល".into(),
        csv_imported: "បាននាំចូល CSV ដោយជោគជ័យ".into(),
        csv_error: "មិនអាចអានឯកសារ CSV បានទេ".into(),
        all_cleared: "បានលុបកំណត់ត្រាទាំងអស់".into(),
        saved: "បានរក្សាទុកការចូលរួម".into(),
        updated: "បានកែប្រែការចូលរួម".into(),
        deleted: "បានលុបការចូលរួម".into(),
    }
}
