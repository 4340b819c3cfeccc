//! Standalone SVG line charts for balance, returns and drawdown.

use crate::domain::metrics::MonthlySummary;
use crate::domain::series::{max_drawdown, DailySeriesRow};

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 480.0;
const PADDING: f64 = 60.0;
const MAX_X_LABELS: usize = 12;

/// One labelled point of a chart.
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Render a polyline chart. Returns an empty string when there is nothing
/// to plot.
pub fn line_chart(title: &str, y_label: &str, points: &[ChartPoint]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if points.len() > 1 {
        plot_width / (points.len() - 1) as f64
    } else {
        0.0
    };

    let x_at = |i: usize| PADDING + i as f64 * scale_x;
    let y_at = |v: f64| {
        if range > 0.0 {
            HEIGHT - PADDING - (v - min) * scale_y
        } else {
            HEIGHT / 2.0
        }
    };

    let polyline: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.1},{:.1}", x_at(i), y_at(p.value)))
        .collect();

    let mut elements = vec![
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}" font-family="sans-serif" font-size="11">"#
        ),
        r#"<rect width="100%" height="100%" fill="white"/>"#.to_string(),
        format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="16" text-anchor="middle">{}</text>"#,
            WIDTH / 2.0,
            PADDING / 2.0,
            escape(title)
        ),
        format!(
            r#"<text x="15" y="{:.1}" transform="rotate(-90 15 {:.1})" text-anchor="middle">{}</text>"#,
            HEIGHT / 2.0,
            HEIGHT / 2.0,
            escape(y_label)
        ),
        // Axes
        format!(
            r#"<line x1="{PADDING:.1}" y1="{PADDING:.1}" x2="{PADDING:.1}" y2="{:.1}" stroke="black"/>"#,
            HEIGHT - PADDING
        ),
        format!(
            r#"<line x1="{PADDING:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black"/>"#,
            HEIGHT - PADDING,
            WIDTH - PADDING,
            HEIGHT - PADDING
        ),
        format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{:.2}</text>"#,
            PADDING - 4.0,
            y_at(max) + 4.0,
            max
        ),
    ];
    if range > 0.0 {
        elements.push(format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{:.2}</text>"#,
            PADDING - 4.0,
            y_at(min) + 4.0,
            min
        ));
    }

    // Gridlines at a bounded number of x labels
    let step = points.len().div_ceil(MAX_X_LABELS).max(1);
    for (i, p) in points.iter().enumerate().step_by(step) {
        let x = x_at(i);
        elements.push(format!(
            r##"<line x1="{x:.1}" y1="{PADDING:.1}" x2="{x:.1}" y2="{:.1}" stroke="#e0e0e0"/>"##,
            HEIGHT - PADDING
        ));
        elements.push(format!(
            r#"<text x="{x:.1}" y="{:.1}" text-anchor="end" transform="rotate(-45 {x:.1} {:.1})">{}</text>"#,
            HEIGHT - PADDING + 14.0,
            HEIGHT - PADDING + 14.0,
            escape(&p.label)
        ));
    }

    elements.push(format!(
        r#"<polyline fill="none" stroke="steelblue" stroke-width="1.5" points="{}"/>"#,
        polyline.join(" ")
    ));
    elements.push("</svg>".to_string());

    let mut svg = elements.join("\n");
    svg.push('\n');
    svg
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn balance_chart(rows: &[DailySeriesRow]) -> String {
    let points: Vec<ChartPoint> = rows
        .iter()
        .map(|r| ChartPoint {
            label: r.timestamp().format("%Y-%m-%d").to_string(),
            value: r.account_balance,
        })
        .collect();
    line_chart("Account Balance Over Time", "Balance", &points)
}

pub fn monthly_returns_chart(monthly: &[MonthlySummary]) -> String {
    let points: Vec<ChartPoint> = monthly
        .iter()
        .map(|m| ChartPoint {
            label: m.month.to_string(),
            value: m.return_pct,
        })
        .collect();
    line_chart("Monthly Returns", "Return (%)", &points)
}

pub fn cumulative_returns_chart(monthly: &[MonthlySummary]) -> String {
    let points: Vec<ChartPoint> = monthly
        .iter()
        .map(|m| ChartPoint {
            label: m.month.to_string(),
            value: m.cumulative_return_pct,
        })
        .collect();
    line_chart("Cumulative Returns", "Cumulative Return (%)", &points)
}

pub fn drawdown_chart(rows: &[DailySeriesRow]) -> String {
    let points: Vec<ChartPoint> = rows
        .iter()
        .map(|r| ChartPoint {
            label: r.timestamp().format("%Y-%m-%d").to_string(),
            value: r.drawdown,
        })
        .collect();
    let title = format!("Drawdown Analysis (Max Drawdown: {:.2}%)", max_drawdown(rows));
    line_chart(&title, "Drawdown (%)", &points)
}
