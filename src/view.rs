use std::fmt::Write;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::dashboard::Snapshot;
use crate::model::Company;
use crate::stats::{compute_stats, group_by_category, CategoryGroup, TrendStats};

const EMPTY_MESSAGE: &str = "No data available. Please sync first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Landscape,
    Trends,
}

/// Full screen: status line, error banner if any, then the selected view.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "AI Radar | {}", snapshot.status_line());
    if let Some(err) = &snapshot.error {
        let _ = writeln!(out, "!! {}", err);
    }
    out.push('\n');
    match snapshot.view {
        ViewMode::Landscape => out.push_str(&render_landscape(&snapshot.companies)),
        ViewMode::Trends => out.push_str(&render_trends(&compute_stats(&snapshot.companies))),
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonScreen<'a> {
    view: ViewMode,
    status: String,
    last_updated: Option<DateTime<Utc>>,
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    landscape: Option<Vec<CategoryGroup<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trends: Option<TrendStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    penetration_percent: Option<u32>,
}

/// Same screen as [`render`], as pretty JSON.
pub fn render_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    let mut screen = JsonScreen {
        view: snapshot.view,
        status: snapshot.status_line(),
        last_updated: snapshot.last_updated,
        error: snapshot.error.as_deref(),
        landscape: None,
        trends: None,
        penetration_percent: None,
    };
    match snapshot.view {
        ViewMode::Landscape => screen.landscape = Some(group_by_category(&snapshot.companies)),
        ViewMode::Trends => {
            let stats = compute_stats(&snapshot.companies);
            screen.penetration_percent = Some(stats.penetration_percent());
            screen.trends = Some(stats);
        }
    }
    serde_json::to_string_pretty(&screen)
}

pub fn render_landscape(companies: &[Company]) -> String {
    if companies.is_empty() {
        return format!("{}\n", EMPTY_MESSAGE);
    }
    let mut out = String::new();
    for group in group_by_category(companies) {
        let _ = writeln!(out, "== {} ({})", group.category, group.companies.len());
        for company in group.companies {
            write_card(&mut out, company);
        }
        out.push('\n');
    }
    out
}

fn write_card(out: &mut String, company: &Company) {
    let r = &company.record;
    let badge = if company.is_ai_native() { " [AI Native]" } else { "" };
    let _ = writeln!(out, "  {} ({}) {}{}", r.name, r.batch, r.website, badge);
    match company.analysis() {
        Some(a) => {
            let _ = writeln!(out, "    {} | {}", a.sub_category, truncate(&a.summary, 100));
            if !a.tags.is_empty() {
                let _ = writeln!(out, "    #{}", a.tags.join(" #"));
            }
        }
        None => {
            let _ = writeln!(
                out,
                "    ({}) {}",
                company.status().as_str(),
                truncate(&r.raw_description, 100)
            );
        }
    }
}

pub fn render_trends(stats: &TrendStats) -> String {
    if stats.total == 0 {
        return format!("{}\n", EMPTY_MESSAGE);
    }
    let mut out = String::new();
    let _ = writeln!(out, "Total Companies Scanned: {}", stats.total);
    let _ = writeln!(
        out,
        "AI Native Companies:     {} ({}% Penetration)",
        stats.total_ai_native,
        stats.penetration_percent()
    );
    let _ = writeln!(
        out,
        "Top Category:            {}",
        stats.top_category().unwrap_or("N/A")
    );

    let _ = writeln!(out, "\n--- AI Native by Category ---");
    for c in &stats.category_distribution {
        let _ = writeln!(out, "  {:<24} {:>3} {}", truncate(&c.name, 24), c.value, bar(c.value));
    }
    let _ = writeln!(out, "\n--- AI Native by Batch ---");
    for b in &stats.batch_distribution {
        let _ = writeln!(out, "  {:<24} {:>3} {}", truncate(&b.name, 24), b.value, bar(b.value));
    }
    out
}

fn bar(n: usize) -> String {
    "#".repeat(n.min(40))
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
