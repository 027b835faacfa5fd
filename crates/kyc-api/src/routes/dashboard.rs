//! # Dashboard & Stats
//!
//! `GET /` renders a read-only HTML page of the audit snapshot; `GET
//! /api/stats` returns the same snapshot as JSON. Both only ever show
//! masked document details.

use std::fmt::Write as _;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use kyc_core::DocumentType;

use crate::audit::StatsSnapshot;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/stats", get(stats))
}

/// Counters and the most recent attempts, newest first.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses((status = 200, description = "Audit snapshot", body = StatsSnapshot)),
    tag = "dashboard"
)]
pub(crate) async fn stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.audit.snapshot())
}

async fn dashboard(State(state): State<AppState>) -> Html<String> {
    Html(render(&state.audit.snapshot()))
}

/// Render the dashboard page.
pub fn render(snapshot: &StatsSnapshot) -> String {
    let counters = &snapshot.counters;
    let mut html = String::with_capacity(4096);

    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>KYC Gateway Dashboard</title>\n<style>\n\
         body{font-family:system-ui,sans-serif;margin:2rem;color:#1f2933}\n\
         .cards{display:flex;gap:1rem;flex-wrap:wrap;margin-bottom:2rem}\n\
         .card{border:1px solid #d9e2ec;border-radius:6px;padding:1rem 1.5rem;min-width:9rem}\n\
         .card b{display:block;font-size:1.6rem}\n\
         table{border-collapse:collapse;width:100%}\n\
         th,td{border-bottom:1px solid #d9e2ec;padding:.5rem;text-align:left}\n\
         .ok{color:#2f8132}.fail{color:#c62828}\n\
         </style>\n</head>\n<body>\n<h1>KYC Gateway</h1>\n<div class=\"cards\">\n",
    );

    card(&mut html, "Total requests", counters.total_requests);
    for document_type in DocumentType::ALL {
        let count = counters.per_type.get(&document_type).copied().unwrap_or(0);
        card(&mut html, document_type.label(), count);
    }
    card(&mut html, "Successful", counters.successful);
    card(&mut html, "Failed", counters.failed);
    html.push_str("</div>\n");

    let _ = writeln!(
        html,
        "<h2>Recent activity (last {})</h2>",
        snapshot.capacity
    );
    if snapshot.recent.is_empty() {
        html.push_str("<p>No verification attempts yet.</p>\n");
    } else {
        html.push_str(
            "<table>\n<thead><tr><th>Time (UTC)</th><th>Type</th><th>Requester</th>\
             <th>Detail</th><th>Status</th></tr></thead>\n<tbody>\n",
        );
        for entry in &snapshot.recent {
            let class = if entry.success { "ok" } else { "fail" };
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{class}\">{}</td></tr>",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.document_type.label(),
                escape(&entry.requester_id),
                escape(&entry.masked_detail),
                entry.status_code,
            );
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn card(html: &mut String, label: &str, value: u64) {
    let _ = writeln!(
        html,
        "<div class=\"card\"><span>{}</span><b>{value}</b></div>",
        escape(label)
    );
}

/// Minimal HTML text escaping for caller-supplied values.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditEntry, AuditStore};

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape("a & b"), "a &amp; b");
    }

    #[test]
    fn empty_store_renders_placeholder() {
        let page = render(&AuditStore::default().snapshot());
        assert!(page.contains("No verification attempts yet"));
        assert!(page.contains("Total requests"));
    }

    #[test]
    fn entries_render_masked_and_escaped() {
        let store = AuditStore::default();
        store.record(AuditEntry::new(
            DocumentType::NationalId,
            "<b>mallory</b>",
            "National ID XXXX-XXXX-9012",
            200,
            true,
        ));
        let page = render(&store.snapshot());
        assert!(page.contains("XXXX-XXXX-9012"));
        assert!(page.contains("&lt;b&gt;mallory&lt;/b&gt;"));
        assert!(!page.contains("<b>mallory</b>"));
    }
}
