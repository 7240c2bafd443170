use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::core::services::summary_service::{SummaryService, TOP_CONTRIBUTORS};
use crate::currency::format_amount;
use crate::ledger::{newest_first, Contribution, Currency, Method};

use super::charts::{BarChart, RankedBarChart, RingChart};
use super::escape_html;
use super::strings::{Locale, StringTable, Translations};

const NO_REMARK: &str = "—";

const STYLESHEET: &str = r#"
    *{margin:0;padding:0;box-sizing:border-box;}
    body{font-family:__FONT__;background:#fff;color:#1e293b;padding:36px 44px;font-size:12.5px;-webkit-print-color-adjust:exact;print-color-adjust:exact;}
    .top-bar{height:5px;background:linear-gradient(90deg,#3B82F6 0%,#6366f1 50%,#10B981 100%);border-radius:3px;margin-bottom:28px;}
    .report-header{text-align:center;margin-bottom:24px;padding-bottom:18px;border-bottom:1.5px solid #e2e8f0;}
    .brand-row{display:flex;align-items:center;justify-content:center;gap:12px;margin-bottom:5px;}
    .brand-icon{width:42px;height:42px;background:#3B82F6;border-radius:11px;display:flex;align-items:center;justify-content:center;color:#fff;font-size:20px;font-weight:800;}
    .brand-name{font-size:22px;font-weight:800;color:#0f172a;}
    .brand-sub{font-size:10.5px;font-weight:600;color:#94a3b8;text-transform:uppercase;letter-spacing:0.8px;margin-bottom:6px;}
    .report-date-line{font-size:11px;color:#64748b;font-weight:500;}
    .cards{display:flex;gap:12px;margin-bottom:24px;}
    .card{flex:1;padding:12px 15px;border-radius:11px;border:1px solid #e2e8f0;background:#f8fafc;}
    .card.blue{border-left:4px solid #3B82F6;}
    .card.green{border-left:4px solid #10B981;}
    .card.purple{border-left:4px solid #818cf8;}
    .card-label{font-size:9.5px;font-weight:700;text-transform:uppercase;color:#94a3b8;margin-bottom:3px;}
    .card-value{font-size:18px;font-weight:800;color:#0f172a;}
    .charts-section{margin-bottom:24px;}
    .section-heading{font-size:10px;font-weight:700;text-transform:uppercase;letter-spacing:0.8px;color:#64748b;margin-bottom:10px;}
    .charts-row{display:flex;gap:16px;margin-bottom:16px;}
    .chart-card{flex:1;border:1px solid #e2e8f0;border-radius:12px;padding:16px;background:#fafafa;display:flex;flex-direction:column;align-items:center;}
    .chart-title{font-size:10px;font-weight:700;text-transform:uppercase;color:#475569;margin-bottom:12px;text-align:center;}
    .chart-card svg{display:block;margin:0 auto;}
    table{width:100%;border-collapse:collapse;border:1px solid #e2e8f0;}
    thead tr{background:#3B82F6;}
    thead th{padding:9px 13px;text-align:left;font-size:9.5px;font-weight:700;text-transform:uppercase;color:#fff;white-space:nowrap;}
    thead th.center{text-align:center;}
    thead th.right{text-align:right;}
    tbody td{padding:8px 13px;border-bottom:1px solid #f1f5f9;color:#334155;vertical-align:middle;}
    .row-alt{background:#f8fafc;}
    .center{text-align:center;}
    .right{text-align:right;}
    .bold-col{font-weight:700;color:#0f172a;}
    .muted{color:#64748b;}
    .no-data{text-align:center;color:#94a3b8;padding:18px;}
    .badge{display:inline-block;padding:2px 8px;border-radius:5px;font-size:10px;font-weight:700;}
    .badge-blue{background:#eff6ff;color:#2563eb;}
    .badge-green{background:#ecfdf5;color:#059669;}
    @media print{body{padding:20px 28px;}}
"#;

fn font_link(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "https://fonts.googleapis.com/css2?family=Plus+Jakarta+Sans:wght@400;500;600;700;800&display=swap",
        Locale::Km => "https://fonts.googleapis.com/css2?family=Noto+Sans+Khmer:wght@400;500;600;700;800&family=Plus+Jakarta+Sans:wght@400;600;700;800&display=swap",
    }
}

fn font_family(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "'Plus Jakarta Sans',sans-serif",
        Locale::Km => "'Noto Sans Khmer','Plus Jakarta Sans',sans-serif",
    }
}

/// Self-contained HTML report over one ledger snapshot.
///
/// Rendering is pure: the generation instant and the strings are injected, so
/// the same inputs always produce the same document.
pub struct ReportDocument<'a> {
    snapshot: &'a [Contribution],
    locale: Locale,
    strings: StringTable,
    generated_at: DateTime<Utc>,
}

impl<'a> ReportDocument<'a> {
    pub fn new(
        snapshot: &'a [Contribution],
        locale: Locale,
        translations: &dyn Translations,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            snapshot,
            locale,
            strings: translations.table(locale),
            generated_at,
        }
    }

    pub fn render(&self) -> String {
        let s = &self.strings;
        let mut html = String::with_capacity(8 * 1024 + self.snapshot.len() * 320);
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"UTF-8\"/>\n<title>{title} – {label}</title>\n<link rel=\"preconnect\" href=\"https://fonts.googleapis.com\"/>\n<link href=\"{font}\" rel=\"stylesheet\"/>\n<style>{css}</style>\n</head>\n<body>\n",
            lang = self.locale.code(),
            title = escape_html(&s.title),
            label = escape_html(&s.report_label),
            font = font_link(self.locale),
            css = STYLESHEET.replace("__FONT__", font_family(self.locale)),
        );
        self.write_header(&mut html);
        self.write_cards(&mut html);
        self.write_charts(&mut html);
        self.write_records(&mut html);
        html.push_str("</body>\n</html>\n");
        html
    }

    fn write_header(&self, html: &mut String) {
        let s = &self.strings;
        let _ = write!(
            html,
            "<div class=\"top-bar\"></div>\n<div class=\"report-header\">\n<div class=\"brand-row\"><div class=\"brand-icon\">$</div><span class=\"brand-name\">{title}</span></div>\n<div class=\"brand-sub\">{subtitle}</div>\n<div class=\"report-date-line\">{generated}: {date}</div>\n</div>\n",
            title = escape_html(&s.title),
            subtitle = escape_html(&s.subtitle),
            generated = escape_html(&s.generated),
            date = self.locale.format_long_date(self.generated_at),
        );
    }

    fn write_cards(&self, html: &mut String) {
        let s = &self.strings;
        let totals = SummaryService::currency_totals(self.snapshot);
        html.push_str("<div class=\"cards\">\n");
        for (class, label, value) in [
            ("blue", &s.usd_total, format_amount(totals.usd, Currency::Usd)),
            ("green", &s.khr_total, format_amount(totals.khr, Currency::Khr)),
            ("purple", &s.participants, self.snapshot.len().to_string()),
        ] {
            let _ = writeln!(
                html,
                "<div class=\"card {class}\"><div class=\"card-label\">{label}</div><div class=\"card-value\">{value}</div></div>",
                label = escape_html(label),
            );
        }
        html.push_str("</div>\n");
    }

    fn write_charts(&self, html: &mut String) {
        let s = &self.strings;
        let methods = SummaryService::method_counts(self.snapshot);
        let currencies = SummaryService::currency_counts(self.snapshot);
        let bars = BarChart::new(
            (s.khqr.as_str(), methods.khqr),
            (s.cash.as_str(), methods.cash),
        );
        let ring = RingChart::new(
            (s.dollar.as_str(), currencies.usd),
            (s.riel.as_str(), currencies.khr),
        );

        let _ = write!(
            html,
            "<div class=\"charts-section\">\n<div class=\"section-heading\">{heading}</div>\n<div class=\"charts-row\">\n",
            heading = escape_html(&s.charts_title),
        );
        chart_card(html, &s.payment_breakdown, &bars.to_svg());
        chart_card(html, &s.currency_distribution, &ring.to_svg());
        html.push_str("</div>\n");

        if !self.snapshot.is_empty() {
            let top = SummaryService::top_contributors(self.snapshot, TOP_CONTRIBUTORS);
            let ranked = RankedBarChart::new(&top, &s.usd_equivalent);
            html.push_str("<div class=\"charts-row\">\n");
            chart_card(html, &s.top_contributors, &ranked.to_svg());
            html.push_str("</div>\n");
        }
        html.push_str("</div>\n");
    }

    fn write_records(&self, html: &mut String) {
        let s = &self.strings;
        let _ = write!(
            html,
            "<div class=\"section-heading\">{heading}</div>\n<table>\n<thead>\n<tr><th class=\"center\" style=\"width:32px\">{no}</th><th>{name}</th><th class=\"center\">{method}</th><th class=\"right\">{amount}</th><th>{remark}</th><th class=\"center\">{date}</th></tr>\n</thead>\n<tbody>\n",
            heading = escape_html(&s.records_title),
            no = escape_html(&s.col_no),
            name = escape_html(&s.col_name),
            method = escape_html(&s.col_method),
            amount = escape_html(&s.col_amount),
            remark = escape_html(&s.col_remark),
            date = escape_html(&s.col_date),
        );

        let rows = newest_first(self.snapshot);
        if rows.is_empty() {
            let _ = writeln!(
                html,
                "<tr><td colspan=\"6\" class=\"no-data\">{}</td></tr>",
                escape_html(&s.no_data)
            );
        }
        for (index, record) in rows.iter().enumerate() {
            let row_class = if index % 2 == 0 { "" } else { "row-alt" };
            let badge = match record.method {
                Method::Khqr => "badge-blue",
                Method::Cash => "badge-green",
            };
            let _ = writeln!(
                html,
                "<tr class=\"{row_class}\"><td class=\"center muted\">{no}</td><td class=\"bold-col\">{name}</td><td class=\"center\"><span class=\"badge {badge}\">{method}</span></td><td class=\"right bold-col\">{amount}</td><td class=\"muted\">{remark}</td><td class=\"center muted\">{date}</td></tr>",
                no = index + 1,
                name = escape_html(&record.name),
                method = escape_html(s.method_label(record.method)),
                amount = format_amount(record.amount, record.currency),
                remark = escape_html(record.remark().unwrap_or(NO_REMARK)),
                date = self.locale.format_short_date(record.created_at),
            );
        }
        html.push_str("</tbody>\n</table>\n");
    }
}

fn chart_card(html: &mut String, title: &str, svg: &str) {
    let _ = writeln!(
        html,
        "<div class=\"chart-card\"><div class=\"chart-title\">{}</div>{svg}</div>",
        escape_html(title)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::strings::BuiltinTranslations;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn record(name: &str, currency: Currency, amount: f64, day: u32) -> Contribution {
        Contribution {
            id: Uuid::new_v4(),
            name: name.to_string(),
            method: Method::Cash,
            currency,
            amount,
            remark: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
        }
    }

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_ledger_renders_placeholders() {
        let html = ReportDocument::new(&[], Locale::En, &BuiltinTranslations, generated()).render();
        assert!(html.contains("No contributions recorded."));
        assert!(html.contains("colspan=\"6\""));
        assert!(html.contains("$0.00"));
        assert!(html.contains("0 ៛"));
        assert!(!html.contains("Top Contributors"));
        assert!(html.contains("Generated on: July 1, 2024"));
    }

    #[test]
    fn totals_stay_separate_and_rows_are_newest_first() {
        let records = [
            record("Older", Currency::Usd, 10.0, 1),
            record("Newer", Currency::Khr, 4100.0, 5),
        ];
        let html =
            ReportDocument::new(&records, Locale::En, &BuiltinTranslations, generated()).render();
        assert!(html.contains(">$10.00<"));
        assert!(html.contains(">4,100 ៛<"));
        assert!(!html.contains("$11.03"));
        let body = &html[html.find("<tbody>").unwrap()..];
        let newer = body.find(">Newer<").unwrap();
        let older = body.find(">Older<").unwrap();
        assert!(newer < older);
        assert!(html.contains(NO_REMARK));
        assert!(html.contains("Top Contributors"));
    }

    #[test]
    fn khmer_document_localizes_labels_and_fonts() {
        let records = [record("ដារ៉ា", Currency::Usd, 5.0, 2)];
        let html =
            ReportDocument::new(&records, Locale::Km, &BuiltinTranslations, generated()).render();
        assert!(html.contains("<html lang=\"km\">"));
        assert!(html.contains("Noto+Sans+Khmer"));
        assert!(html.contains("សាច់ប្រាក់"));
        assert!(html.contains("2/6/2024"));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut hostile = record("<script>alert(1)</script>", Currency::Usd, 1.0, 3);
        hostile.remark = "a & b".into();
        let html = ReportDocument::new(
            std::slice::from_ref(&hostile),
            Locale::En,
            &BuiltinTranslations,
            generated(),
        )
        .render();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
    }
}
