//! SVG chart builders. Geometry is computed into plain structs first so it can be
//! checked without parsing markup; `to_svg` only serializes it.

use std::f64::consts::PI;
use std::fmt::Write as _;

use crate::core::services::summary_service::ContributorTotal;
use crate::currency::{abbreviate_usd, format_amount, ranking_units};
use crate::ledger::Currency;

use super::escape_html;

pub const PRIMARY: &str = "#3B82F6";
pub const SECONDARY: &str = "#10B981";
const GRID: &str = "#e2e8f0";
const AXIS: &str = "#cbd5e1";
const MUTED: &str = "#64748b";
const INK: &str = "#0f172a";

/// Rounds to two decimals for compact, stable markup.
fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{:.2}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

// ---------------------------------------------------------------------------
// Vertical bar chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub count: usize,
    pub color: &'static str,
    pub x: f64,
    pub height: f64,
}

/// Two-category count chart (payment method breakdown).
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    bars: [Bar; 2],
}

impl BarChart {
    pub const WIDTH: f64 = 340.0;
    pub const HEIGHT: f64 = 160.0;
    pub const PLOT_HEIGHT: f64 = 110.0;
    pub const BAR_WIDTH: f64 = 60.0;
    pub const GAP: f64 = 50.0;
    pub const MIN_BAR_HEIGHT: f64 = 4.0;
    pub const BASELINE: f64 = Self::HEIGHT - 30.0;

    pub fn new(first: (&str, usize), second: (&str, usize)) -> Self {
        let max = first.1.max(second.1).max(1);
        let center = Self::WIDTH / 2.0;
        let make = |(label, count): (&str, usize), color: &'static str, x: f64| Bar {
            label: label.to_string(),
            count,
            color,
            x,
            height: bar_height(count, max),
        };
        Self {
            bars: [
                make(first, PRIMARY, center - Self::BAR_WIDTH - Self::GAP / 2.0),
                make(second, SECONDARY, center + Self::GAP / 2.0),
            ],
        }
    }

    pub fn bars(&self) -> &[Bar; 2] {
        &self.bars
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(Self::WIDTH),
            h = num(Self::HEIGHT)
        );
        for fraction in [0.0, 0.5, 1.0] {
            let y = Self::BASELINE - fraction * Self::PLOT_HEIGHT;
            let _ = write!(
                svg,
                r#"<line x1="20" y1="{y}" x2="{x2}" y2="{y}" stroke="{GRID}" stroke-width="1"/>"#,
                y = num(y),
                x2 = num(Self::WIDTH - 20.0)
            );
        }
        for bar in &self.bars {
            let top = Self::BASELINE - bar.height;
            let mid = bar.x + Self::BAR_WIDTH / 2.0;
            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{y}" width="{bw}" height="{h}" fill="{c}" rx="6"/>"#,
                x = num(bar.x),
                y = num(top),
                bw = num(Self::BAR_WIDTH),
                h = num(bar.height),
                c = bar.color
            );
            let _ = write!(
                svg,
                r#"<text x="{m}" y="{y}" text-anchor="middle" font-size="12" font-weight="700" fill="{c}">{n}</text>"#,
                m = num(mid),
                y = num(top - 6.0),
                c = bar.color,
                n = bar.count
            );
            let _ = write!(
                svg,
                r#"<text x="{m}" y="{y}" text-anchor="middle" font-size="11" fill="{MUTED}">{l}</text>"#,
                m = num(mid),
                y = num(Self::BASELINE + 16.0),
                l = escape_html(&bar.label)
            );
        }
        let _ = write!(
            svg,
            r#"<line x1="20" y1="{y}" x2="{x2}" y2="{y}" stroke="{AXIS}" stroke-width="1.5"/></svg>"#,
            y = num(Self::BASELINE),
            x2 = num(Self::WIDTH - 20.0)
        );
        svg
    }
}

/// Height of one bar: proportional to `count / max`, but never below
/// [`BarChart::MIN_BAR_HEIGHT`] for a positive count.
pub fn bar_height(count: usize, max: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let proportional = count as f64 / max.max(1) as f64 * BarChart::PLOT_HEIGHT;
    proportional.max(BarChart::MIN_BAR_HEIGHT)
}

// ---------------------------------------------------------------------------
// Ring chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RingSegment {
    /// Annular sector between the inner and outer radius.
    Sector { path: String, color: &'static str },
    /// A category owning the whole circle.
    FullRing { color: &'static str },
}

/// Two-category share chart (currency distribution).
#[derive(Debug, Clone, PartialEq)]
pub struct RingChart {
    labels: [String; 2],
    counts: [usize; 2],
    segments: Vec<RingSegment>,
}

impl RingChart {
    pub const SIZE: f64 = 160.0;
    pub const CENTER: f64 = Self::SIZE / 2.0;
    pub const OUTER_RADIUS: f64 = 58.0;
    pub const INNER_RADIUS: f64 = 34.0;
    const LEGEND_HEIGHT: f64 = 30.0;

    pub fn new(first: (&str, usize), second: (&str, usize)) -> Self {
        let total = first.1 + second.1;
        let mut segments = Vec::new();
        if total > 0 {
            let split = first.1 as f64 / total as f64 * 360.0;
            segments.extend(annular_sector(0.0, split, PRIMARY));
            segments.extend(annular_sector(split, 360.0, SECONDARY));
        }
        Self {
            labels: [first.0.to_string(), second.0.to_string()],
            counts: [first.1, second.1],
            segments,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Filled segments; empty when there is nothing to show.
    pub fn segments(&self) -> &[RingSegment] {
        &self.segments
    }

    pub fn to_svg(&self) -> String {
        let (c, r, inner) = (Self::CENTER, Self::OUTER_RADIUS, Self::INNER_RADIUS);
        let height = Self::SIZE + Self::LEGEND_HEIGHT;
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(Self::SIZE),
            h = num(height)
        );

        if self.segments.is_empty() {
            let _ = write!(
                svg,
                r#"<circle cx="{c}" cy="{c}" r="{r}" fill="none" stroke="{GRID}" stroke-width="{sw}"/>"#,
                c = num(c),
                r = num(r),
                sw = num(r - inner)
            );
        }
        for segment in &self.segments {
            match segment {
                RingSegment::Sector { path, color } => {
                    let _ = write!(svg, r#"<path d="{path}" fill="{color}"/>"#);
                }
                RingSegment::FullRing { color } => {
                    let _ = write!(
                        svg,
                        r#"<circle cx="{c}" cy="{c}" r="{mid}" fill="none" stroke="{color}" stroke-width="{sw}"/>"#,
                        c = num(c),
                        mid = num((r + inner) / 2.0),
                        sw = num(r - inner)
                    );
                }
            }
        }

        let total = self.total();
        if total > 0 {
            let _ = write!(
                svg,
                r#"<text x="{x}" y="{y}" text-anchor="middle" font-size="16" font-weight="800" fill="{INK}">{total}</text>"#,
                x = num(c),
                y = num(c + 5.0)
            );
        }

        let legend_y = Self::SIZE + 14.0;
        for (index, (label, color)) in self.labels.iter().zip([PRIMARY, SECONDARY]).enumerate() {
            let x = if index == 0 { c - 80.0 } else { c + 4.0 };
            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{y}" width="10" height="10" rx="2" fill="{color}"/><text x="{tx}" y="{ty}" font-size="10" fill="{MUTED}">{label} ({count})</text>"#,
                x = num(x),
                y = num(legend_y),
                tx = num(x + 14.0),
                ty = num(legend_y + 9.0),
                label = escape_html(label),
                count = self.counts[index]
            );
        }
        svg.push_str("</svg>");
        svg
    }
}

/// Converts a clockwise angle measured from 12 o'clock into canvas coordinates.
pub fn polar_to_cartesian(center: f64, radius: f64, angle_deg: f64) -> (f64, f64) {
    let radians = (angle_deg - 90.0) * PI / 180.0;
    (
        center + radius * radians.cos(),
        center + radius * radians.sin(),
    )
}

/// Segment between two angles. A zero sweep draws nothing and a full sweep
/// becomes a ring, since the arc's start and end points coincide there.
pub fn annular_sector(start_deg: f64, end_deg: f64, color: &'static str) -> Option<RingSegment> {
    let sweep = end_deg - start_deg;
    if sweep <= 0.0 {
        return None;
    }
    if sweep >= 360.0 {
        return Some(RingSegment::FullRing { color });
    }
    let (c, r, inner) = (
        RingChart::CENTER,
        RingChart::OUTER_RADIUS,
        RingChart::INNER_RADIUS,
    );
    let (sx, sy) = polar_to_cartesian(c, r, start_deg);
    let (ex, ey) = polar_to_cartesian(c, r, end_deg);
    let (six, siy) = polar_to_cartesian(c, inner, start_deg);
    let (eix, eiy) = polar_to_cartesian(c, inner, end_deg);
    let large = u8::from(sweep > 180.0);
    let path = format!(
        "M{},{} A{},{} 0 {large},1 {},{} L{},{} A{},{} 0 {large},0 {},{} Z",
        num(sx),
        num(sy),
        num(r),
        num(r),
        num(ex),
        num(ey),
        num(eix),
        num(eiy),
        num(inner),
        num(inner),
        num(six),
        num(siy),
    );
    Some(RingSegment::Sector { path, color })
}

// ---------------------------------------------------------------------------
// Ranked horizontal chart
// ---------------------------------------------------------------------------

/// One contributor row. Widths are in pixels; amounts stay in their own currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub name: String,
    pub usd: f64,
    pub khr: f64,
    pub y: f64,
    pub usd_width: f64,
    pub khr_width: f64,
}

/// Stacked USD/KHR bars per contributor on a shared USD-equivalent axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedBarChart {
    rows: Vec<RankedRow>,
    axis_max: f64,
    axis_label: String,
}

impl RankedBarChart {
    pub const WIDTH: f64 = 520.0;
    pub const PLOT_LEFT: f64 = 130.0;
    pub const PLOT_WIDTH: f64 = 360.0;
    pub const ROW_HEIGHT: f64 = 22.0;
    pub const BAR_HEIGHT: f64 = 14.0;
    const TOP: f64 = 8.0;
    const AXIS_SPACE: f64 = 40.0;
    const TICKS: usize = 4;

    pub fn new(entries: &[ContributorTotal], axis_label: &str) -> Self {
        let max_score = entries
            .iter()
            .map(ContributorTotal::score)
            .fold(0.0_f64, f64::max);
        let axis_max = max_score.max(1.0);
        let scale = Self::PLOT_WIDTH / axis_max;
        let rows = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| RankedRow {
                name: entry.name.clone(),
                usd: entry.usd,
                khr: entry.khr,
                y: Self::TOP + index as f64 * Self::ROW_HEIGHT,
                usd_width: ranking_units(entry.usd, Currency::Usd) * scale,
                khr_width: ranking_units(entry.khr, Currency::Khr) * scale,
            })
            .collect();
        Self {
            rows,
            axis_max,
            axis_label: axis_label.to_string(),
        }
    }

    pub fn rows(&self) -> &[RankedRow] {
        &self.rows
    }

    pub fn axis_max(&self) -> f64 {
        self.axis_max
    }

    /// Tick values and their abbreviated labels, from zero to the axis maximum.
    pub fn ticks(&self) -> Vec<(f64, String)> {
        (0..=Self::TICKS)
            .map(|step| {
                let value = self.axis_max * step as f64 / Self::TICKS as f64;
                (value, abbreviate_usd(value))
            })
            .collect()
    }

    pub fn height(&self) -> f64 {
        Self::TOP + self.rows.len() as f64 * Self::ROW_HEIGHT + Self::AXIS_SPACE
    }

    pub fn to_svg(&self) -> String {
        let height = self.height();
        let axis_y = Self::TOP + self.rows.len() as f64 * Self::ROW_HEIGHT;
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(Self::WIDTH),
            h = num(height)
        );

        for (value, label) in self.ticks() {
            let x = Self::PLOT_LEFT + value / self.axis_max * Self::PLOT_WIDTH;
            let _ = write!(
                svg,
                r#"<line x1="{x}" y1="{top}" x2="{x}" y2="{y}" stroke="{GRID}" stroke-width="1"/><text x="{x}" y="{ty}" text-anchor="middle" font-size="9" fill="{MUTED}">{label}</text>"#,
                x = num(x),
                top = num(Self::TOP),
                y = num(axis_y),
                ty = num(axis_y + 12.0),
            );
        }

        for row in &self.rows {
            let bar_y = row.y + (Self::ROW_HEIGHT - Self::BAR_HEIGHT) / 2.0;
            let name = escape_html(&row.name);
            let _ = write!(
                svg,
                r#"<text x="{x}" y="{y}" text-anchor="end" font-size="10" fill="{INK}">{name}</text>"#,
                x = num(Self::PLOT_LEFT - 6.0),
                y = num(bar_y + Self::BAR_HEIGHT - 3.0),
            );
            let mut cursor = Self::PLOT_LEFT;
            for (amount, width, currency, color) in [
                (row.usd, row.usd_width, Currency::Usd, PRIMARY),
                (row.khr, row.khr_width, Currency::Khr, SECONDARY),
            ] {
                if width <= 0.0 {
                    continue;
                }
                let _ = write!(
                    svg,
                    r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{color}"><title>{name}: {amount}</title></rect>"#,
                    x = num(cursor),
                    y = num(bar_y),
                    w = num(width),
                    h = num(Self::BAR_HEIGHT),
                    amount = format_amount(amount, currency),
                );
                cursor += width;
            }
            let _ = write!(
                svg,
                r#"<text x="{x}" y="{y}" font-size="9" fill="{MUTED}">{label}</text>"#,
                x = num(cursor + 4.0),
                y = num(bar_y + Self::BAR_HEIGHT - 3.0),
                label = amounts_label(row.usd, row.khr),
            );
        }

        let _ = write!(
            svg,
            r#"<line x1="{l}" y1="{y}" x2="{r}" y2="{y}" stroke="{AXIS}" stroke-width="1.5"/><text x="{mid}" y="{ly}" text-anchor="middle" font-size="9" fill="{MUTED}">{label}</text></svg>"#,
            l = num(Self::PLOT_LEFT),
            r = num(Self::PLOT_LEFT + Self::PLOT_WIDTH),
            y = num(axis_y),
            mid = num(Self::PLOT_LEFT + Self::PLOT_WIDTH / 2.0),
            ly = num(axis_y + 28.0),
            label = escape_html(&self.axis_label),
        );
        svg
    }
}

/// Original amounts of a row, e.g. `$12.00 + 4,100 ៛`.
fn amounts_label(usd: f64, khr: f64) -> String {
    let mut parts = Vec::with_capacity(2);
    if usd > 0.0 {
        parts.push(format_amount(usd, Currency::Usd));
    }
    if khr > 0.0 {
        parts.push(format_amount(khr, Currency::Khr));
    }
    parts.join(" + ")
}
