//! Printable report: localized strings, SVG charts and the HTML document that
//! combines them.

pub mod charts;
pub mod document;
pub mod strings;

pub use charts::{BarChart, RankedBarChart, RingChart, RingSegment};
pub use document::ReportDocument;
pub use strings::{BuiltinTranslations, Locale, StringTable, Translations};

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn markup_characters_are_escaped() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("ស្រីមុំ"), "ស្រីមុំ");
    }
}
