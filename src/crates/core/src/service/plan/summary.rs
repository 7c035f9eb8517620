//! Bounded plan summaries for model context.
//!
//! Every node line carries its stable id so generated operations can
//! reference real nodes. Truncation happens on whole lines, never inside
//! an id.

use tripmesh_core_types::{NodeKind, PlanNode, TripPlan};

pub const DEFAULT_SUMMARY_BUDGET: usize = 6000;

pub fn summarize_plan(plan: &TripPlan, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(
        "Trip \"{}\" (id {}, version {}), {} travelers, currency {}",
        plan.title,
        plan.trip_id,
        plan.version,
        plan.settings.travelers,
        plan.settings.currency
    ));

    for day in &plan.days {
        let date = day
            .date
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        lines.push(format!(
            "Day {}{} - {} items, est. {}",
            day.day_number,
            date,
            day.nodes.len(),
            format_cents(day.total_cost_cents(), &plan.settings.currency)
        ));
        for node in &day.nodes {
            lines.push(format_node_line(node, &plan.settings.currency));
        }
    }

    let mut out = String::new();
    for line in lines {
        // +1 for the newline; leave room for the truncation marker.
        if out.len() + line.len() + 1 > max_chars.saturating_sub(16) {
            out.push_str("[truncated]\n");
            break;
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn format_node_line(node: &PlanNode, currency: &str) -> String {
    let time = node
        .time
        .as_ref()
        .map(|t| format!(" {}-{}", t.start, t.end))
        .unwrap_or_default();
    let cost = node
        .cost
        .as_ref()
        .map(|c| format!(", {}", format_cents(c.amount_cents, &c.currency)))
        .unwrap_or_else(|| format!(", no cost in {}", currency));
    let locked = if node.locked { " [locked]" } else { "" };
    format!(
        "  [{}]{} {}: {}{}{}",
        node.node_id,
        time,
        kind_label(node.kind),
        node.title,
        cost,
        locked
    )
}

fn kind_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Activity => "activity",
        NodeKind::Meal => "meal",
        NodeKind::Transit => "transit",
        NodeKind::Lodging => "lodging",
        NodeKind::Booking => "booking",
        NodeKind::FreeTime => "free time",
    }
}

fn format_cents(amount_cents: i64, currency: &str) -> String {
    format!("{}.{:02} {}", amount_cents / 100, (amount_cents % 100).abs(), currency)
}
