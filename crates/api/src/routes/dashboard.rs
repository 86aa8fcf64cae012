//! HTML dashboard of received messages.

use axum::{extract::State, response::Html};
use relay_core::Record;
use telemetry::health;

use crate::state::AppState;

/// Escape text for interpolation into HTML element content or attributes.
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Dashboard header figures.
pub struct DashboardSummary<'a> {
    pub buffered: usize,
    pub archived: usize,
    pub sink: &'a str,
    pub sink_healthy: bool,
}

fn render_row(record: &Record) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        html_escape(&record.formatted_date()),
        html_escape(&record.kind),
        html_escape(&record.sender),
        html_escape(&record.body),
    )
}

/// Render the page. `records` are shown in the order given.
pub fn render_dashboard(summary: &DashboardSummary<'_>, records: &[Record]) -> String {
    let rows = if records.is_empty() {
        "<tr><td colspan=\"4\">No messages received yet.</td></tr>".to_string()
    } else {
        records.iter().map(render_row).collect::<Vec<_>>().join("\n")
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>SMS Relay</title>\n\
<style>body{{font-family:sans-serif;margin:2rem}}table{{border-collapse:collapse;width:100%}}\
td,th{{border:1px solid #ccc;padding:.4rem;text-align:left;vertical-align:top}}\
.ok{{color:#2a7a2a}}.bad{{color:#b22}}</style>\n</head>\n<body>\n\
<h1>Received SMS</h1>\n\
<p>Buffered: {} &middot; Archived: {} &middot; Sink: {} <span class=\"{}\">{}</span></p>\n\
<table>\n<thead><tr><th>Date</th><th>Type</th><th>Sender</th><th>Message</th></tr></thead>\n<tbody>\n{}\n</tbody>\n</table>\n\
</body>\n</html>\n",
        summary.buffered,
        summary.archived,
        html_escape(summary.sink),
        if summary.sink_healthy { "ok" } else { "bad" },
        if summary.sink_healthy { "healthy" } else { "failing" },
        rows,
    )
}

/// GET / and GET /sms - archived messages, newest first.
pub async fn dashboard_handler(State(state): State<AppState>) -> Html<String> {
    let records = state.archive.newest_first();
    let summary = DashboardSummary {
        buffered: state.buffer.len(),
        archived: records.len(),
        sink: state.buffer.sink_name(),
        sink_healthy: health().sink.is_healthy(),
    };

    Html(render_dashboard(&summary, &records))
}
