//! Cumulative-series charts rendered as standalone SVG line plots.
//!
//! One point per logged event, x = event number, y = running total.

use std::fmt::Write as _;

use crate::channels::Attachment;
use crate::tracker::SeriesKind;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;
const Y_TICKS: usize = 5;

/// A cumulative series ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeChart {
    pub kind: SeriesKind,
    pub values: Vec<f64>,
}

impl CumulativeChart {
    pub fn new(kind: SeriesKind, values: Vec<f64>) -> Self {
        Self { kind, values }
    }

    pub fn file_name(&self) -> String {
        match self.kind {
            SeriesKind::Water => "water.svg".to_string(),
            SeriesKind::Calories => "calories.svg".to_string(),
        }
    }

    pub fn render_svg(&self) -> String {
        render_svg(self.kind.title(), self.kind.unit(), &self.values)
    }

    pub fn to_attachment(&self) -> Attachment {
        Attachment {
            file_name: self.file_name(),
            mime_type: "image/svg+xml".to_string(),
            caption: Some(self.kind.title().to_string()),
            bytes: self.render_svg().into_bytes(),
        }
    }
}

/// Render `values` as a polyline with markers, a grid and labelled axes.
///
/// Callers are expected to skip empty series; an empty slice still renders
/// an empty frame.
pub fn render_svg(title: &str, unit: &str, values: &[f64]) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };
    let x_span = values.len().saturating_sub(1).max(1) as f64;

    let x_at = |i: usize| MARGIN_LEFT + plot_w * (i as f64) / x_span;
    let y_at = |v: f64| MARGIN_TOP + plot_h * (1.0 - v / y_max);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="12">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="24" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    );

    for tick in 0..=Y_TICKS {
        let value = y_max * tick as f64 / Y_TICKS as f64;
        let y = y_at(value);
        let _ = writeln!(
            svg,
            r##"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#ddd"/>"##,
            WIDTH - MARGIN_RIGHT
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            MARGIN_LEFT - 6.0,
            y + 4.0,
            value.round()
        );
    }

    let _ = writeln!(
        svg,
        r#"<text x="16" y="{:.1}" transform="rotate(-90 16 {:.1})" text-anchor="middle">{}</text>"#,
        MARGIN_TOP + plot_h / 2.0,
        MARGIN_TOP + plot_h / 2.0,
        escape(unit)
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">Event</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        HEIGHT - 12.0
    );

    if !values.is_empty() {
        let points: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:.1},{:.1}", x_at(i), y_at(*v)))
            .collect();
        let _ = writeln!(
            svg,
            r##"<polyline fill="none" stroke="#1f77b4" stroke-width="2" points="{}"/>"##,
            points.join(" ")
        );
        for (i, v) in values.iter().enumerate() {
            let _ = writeln!(
                svg,
                r##"<circle cx="{:.1}" cy="{:.1}" r="4" fill="#1f77b4"><title>{}: {} {}</title></circle>"##,
                x_at(i),
                y_at(*v),
                i + 1,
                v,
                escape(unit)
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
