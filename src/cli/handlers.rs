use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::core::services::summary_service::TOP_CONTRIBUTORS;
use crate::core::services::{SummaryService, TransferService};
use crate::currency::format_amount;
use crate::ledger::{Contribution, ContributionForm, ContributionPatch, Currency};
use crate::notify::Severity;
use crate::report::strings::{BuiltinTranslations, Locale, Translations};
use crate::report::ReportDocument;
use crate::utils::build_info;

use super::output;
use super::table::{Table, TableColumn};
use super::{CliError, Command, ContributionArgs, Session};

const ID_PREFIX_LEN: usize = 8;

pub(super) fn dispatch(session: &mut Session, command: Command) -> Result<(), CliError> {
    match command {
        Command::Add(args) => add(session, args),
        Command::List { search } => list(session, search.as_deref()),
        Command::Update { id, fields } => update(session, &id, fields),
        Command::Delete { id } => delete(session, &id),
        Command::Clear => {
            let transfer = TransferService::new(session.strings.clone());
            transfer.clear_all(&mut session.store, &session.notifications)?;
            Ok(())
        }
        Command::Summary => summary(session),
        Command::Export { output } => export(session, &output),
        Command::Import { path } => import(session, &path),
        Command::Report { output } => report(session, &output),
        Command::Language { locale } => language(session, locale),
        Command::Version => {
            output::info(build_info::current().summary());
            Ok(())
        }
    }
}

fn add(session: &mut Session, args: ContributionArgs) -> Result<(), CliError> {
    let form = ContributionForm {
        name: args.name.unwrap_or_default(),
        method: args.method,
        currency: args.currency,
        amount: args.amount.unwrap_or_default(),
        remark: args.remark.unwrap_or_default(),
    };
    let draft = form.validate()?;
    let record = session.store.add(draft)?;
    session
        .notifications
        .push(session.strings.saved.clone(), Severity::Success);
    output::info(format!("{} {}", short_id(record.id), record.name));
    Ok(())
}

fn update(session: &mut Session, id: &str, args: ContributionArgs) -> Result<(), CliError> {
    let record = resolve(session, id)?;
    let mut form = ContributionForm::from(&record);
    let mut changed = false;
    if let Some(name) = args.name {
        form.name = name;
        changed = true;
    }
    if let Some(method) = args.method {
        form.method = Some(method);
        changed = true;
    }
    if let Some(currency) = args.currency {
        form.currency = Some(currency);
        changed = true;
    }
    if let Some(amount) = args.amount {
        form.amount = amount;
        changed = true;
    }
    if let Some(remark) = args.remark {
        form.remark = remark;
        changed = true;
    }
    if !changed {
        return Err(CliError::EmptyUpdate);
    }

    let patch = ContributionPatch::from(form.validate()?);
    if session.store.update(record.id, &patch)? {
        session
            .notifications
            .push(session.strings.updated.clone(), Severity::Success);
    }
    Ok(())
}

fn delete(session: &mut Session, id: &str) -> Result<(), CliError> {
    let record = resolve(session, id)?;
    if session.store.delete(record.id)? {
        session
            .notifications
            .push(session.strings.deleted.clone(), Severity::Success);
    }
    Ok(())
}

fn list(session: &Session, search: Option<&str>) -> Result<(), CliError> {
    let s = &session.strings;
    let records = match search {
        Some(query) => session.store.search(query),
        None => session.store.newest_first(),
    };
    if records.is_empty() {
        output::info(&s.no_data);
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::right(&s.col_no),
        TableColumn::left("ID"),
        TableColumn::left(&s.col_name).max_width(24),
        TableColumn::left(&s.col_method),
        TableColumn::right(&s.col_amount),
        TableColumn::left(&s.col_remark).max_width(24),
        TableColumn::left(&s.col_date),
    ]);
    for (index, record) in records.iter().enumerate() {
        table.push(vec![
            (index + 1).to_string(),
            short_id(record.id),
            record.name.clone(),
            s.method_label(record.method).to_string(),
            format_amount(record.amount, record.currency),
            record.remark().unwrap_or("—").to_string(),
            session.locale.format_short_date(record.created_at),
        ]);
    }
    println!("{}", table.render());
    Ok(())
}

fn summary(session: &Session) -> Result<(), CliError> {
    let s = &session.strings;
    let snapshot = session.store.snapshot();
    let overview = SummaryService::summarize(snapshot);

    output::section(&s.title);
    println!("{}: {}", s.usd_total, format_amount(overview.totals.usd, Currency::Usd));
    println!("{}: {}", s.khr_total, format_amount(overview.totals.khr, Currency::Khr));
    println!("{}: {}", s.participants, overview.participants);

    output::section(&s.payment_breakdown);
    println!("{}: {}", s.khqr, overview.methods.khqr);
    println!("{}: {}", s.cash, overview.methods.cash);

    output::section(&s.currency_distribution);
    println!("{}: {}", s.dollar, overview.currencies.usd);
    println!("{}: {}", s.riel, overview.currencies.khr);

    let top = SummaryService::top_contributors(snapshot, TOP_CONTRIBUTORS);
    if !top.is_empty() {
        output::section(&s.top_contributors);
        let mut table = Table::new(vec![
            TableColumn::right(&s.col_no),
            TableColumn::left(&s.col_name).max_width(24),
            TableColumn::right(&s.dollar),
            TableColumn::right(&s.riel),
        ]);
        for (rank, entry) in top.iter().enumerate() {
            table.push(vec![
                (rank + 1).to_string(),
                entry.name.clone(),
                format_amount(entry.usd, Currency::Usd),
                format_amount(entry.khr, Currency::Khr),
            ]);
        }
        println!("{}", table.render());
    }
    Ok(())
}

fn export(session: &Session, destination: &Path) -> Result<(), CliError> {
    let text = TransferService::new(session.strings.clone()).export_csv(&session.store);
    if destination == Path::new("-") {
        io::stdout()
            .write_all(text.as_bytes())
            .map_err(|source| file_error(destination, source))?;
        return Ok(());
    }
    fs::write(destination, text).map_err(|source| file_error(destination, source))?;
    output::success(format!(
        "{} -> {}",
        session.store.len(),
        destination.display()
    ));
    Ok(())
}

fn import(session: &mut Session, path: &Path) -> Result<(), CliError> {
    let text = fs::read_to_string(path).map_err(|source| file_error(path, source))?;
    let transfer = TransferService::new(session.strings.clone());
    transfer.import_csv(&mut session.store, &text, &session.notifications)?;
    Ok(())
}

fn report(session: &Session, destination: &Path) -> Result<(), CliError> {
    let html = ReportDocument::new(
        session.store.snapshot(),
        session.locale,
        &BuiltinTranslations,
        Utc::now(),
    )
    .render();
    fs::write(destination, html).map_err(|source| file_error(destination, source))?;
    tracing::info!(path = %destination.display(), records = session.store.len(), "report written");
    output::success(format!("{} -> {}", session.strings.report_label, destination.display()));
    Ok(())
}

fn language(session: &mut Session, requested: Option<Locale>) -> Result<(), CliError> {
    let locale = match requested {
        Some(locale) => {
            session.config.set_locale(locale)?;
            locale
        }
        None => session.config.toggle_locale()?,
    };
    session.locale = locale;
    session.strings = BuiltinTranslations.table(locale);
    output::success(locale);
    Ok(())
}

/// Finds the record whose id equals `raw` or starts with it.
fn resolve(session: &Session, raw: &str) -> Result<Contribution, CliError> {
    let needle = raw.trim().to_ascii_lowercase();
    if let Ok(id) = Uuid::parse_str(&needle) {
        return session
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| CliError::NotFound(raw.to_string()));
    }
    if needle.is_empty() {
        return Err(CliError::NotFound(raw.to_string()));
    }
    let mut matches = session
        .store
        .snapshot()
        .iter()
        .filter(|record| record.id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(record), None) => Ok(record.clone()),
        (None, _) => Err(CliError::NotFound(raw.to_string())),
        (Some(_), Some(_)) => Err(CliError::Ambiguous(raw.to_string())),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..ID_PREFIX_LEN].to_string()
}

fn file_error(path: &Path, source: io::Error) -> CliError {
    CliError::File {
        path: PathBuf::from(path),
        source,
    }
}
