use std::fmt;

use colored::Colorize;

use crate::notify::{Notification, Severity};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
    Section,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[ok]",
        MessageKind::Error => "[x]",
        MessageKind::Section => "",
    }
}

pub fn styled(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Info => format!("{} {text}", label(kind)),
        MessageKind::Success => format!("{} {text}", label(kind)).bright_green().to_string(),
        MessageKind::Error => format!("{} {text}", label(kind)).bright_red().to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    match kind {
        MessageKind::Error => eprintln!("{}", styled(kind, message)),
        MessageKind::Section => println!("\n{}", styled(kind, message)),
        _ => println!("{}", styled(kind, message)),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Prints a queued notification with the style of its severity.
pub fn notification(entry: &Notification) {
    match entry.severity {
        Severity::Success => success(&entry.message),
        Severity::Error => error(&entry.message),
    }
}
