//! # Text Reports
//!
//! Plain-text renderings of the live inventory sheet and the report archive,
//! for the CLI and for printing at close.
//!
//! ```text
//! Hearth Bakery | Shift 5f0c2a91 (OPEN)
//! Item                   Category   Beg  Prod Total   End  Sold     Price     Amount
//! MONAY                  Bread       10    20    30     5    23     $5.00    $115.00
//! ...
//! Total sold:         23
//! Production cost:    $40.00
//! ```

use hearth_core::{Money, Shift, ShiftReport, ShiftSummary};

use crate::state::AppConfig;

const NAME_WIDTH: usize = 22;

/// Store name and currency used in headers and amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStyle {
    pub store_name: String,
    pub currency_symbol: String,
}

impl ReportStyle {
    pub fn from_config(config: &AppConfig) -> Self {
        ReportStyle {
            store_name: config.store.name.clone(),
            currency_symbol: config.store.currency_symbol.clone(),
        }
    }

    fn money(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }
}

impl Default for ReportStyle {
    fn default() -> Self {
        ReportStyle {
            store_name: "Hearth Bakery".to_string(),
            currency_symbol: "$".to_string(),
        }
    }
}

// =============================================================================
// Shift Sheet
// =============================================================================

/// The inventory sheet for one shift, one row per catalog item, then totals.
pub fn render_shift_sheet(summary: &ShiftSummary, shift: &Shift, style: &ReportStyle) -> String {
    let mut lines = Vec::with_capacity(summary.rows.len() + 10);

    lines.push(format!(
        "{} | Shift {} ({})",
        style.store_name,
        short_id(&shift.id),
        shift.status
    ));
    if let Some(start) = shift.start_time {
        let mut span = format!("Started {}", start.format("%Y-%m-%d %H:%M UTC"));
        if let Some(end) = shift.end_time {
            span.push_str(&format!(", ended {}", end.format("%Y-%m-%d %H:%M UTC")));
        }
        lines.push(span);
    }
    lines.push(String::new());

    lines.push(format!(
        "{:<name$} {:<9} {:>5} {:>5} {:>5} {:>5} {:>5} {:>9} {:>10}",
        "Item",
        "Category",
        "Beg",
        "Prod",
        "Total",
        "End",
        "Sold",
        "Price",
        "Amount",
        name = NAME_WIDTH
    ));

    for row in &summary.rows {
        let ending = row
            .ending
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:<name$} {:<9} {:>5} {:>5} {:>5} {:>5} {:>5} {:>9} {:>10}",
            truncate(&row.name, NAME_WIDTH),
            row.category.as_str(),
            row.beginning,
            row.produced,
            row.total,
            ending,
            row.sold,
            style.money(row.price),
            style.money(row.amount),
            name = NAME_WIDTH
        ));
    }

    lines.push(String::new());
    lines.push(format!("Total sold:         {}", summary.total_sold));
    lines.push(format!(
        "Production cost:    {}",
        style.money(summary.total_cost)
    ));
    lines.push(format!(
        "Revenue:            {}",
        style.money(summary.total_revenue)
    ));
    lines.push(format!(
        "Estimated profit:   {}",
        style.money(summary.estimated_profit)
    ));
    lines.push(format!(
        "Discharge loss:     {} units, {}",
        summary.discharges.count,
        style.money(summary.discharges.cost)
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

// =============================================================================
// Report History
// =============================================================================

/// One line per archived report, in the order given.
pub fn render_report_history(reports: &[ShiftReport], style: &ReportStyle) -> String {
    if reports.is_empty() {
        return "No archived shift reports.\n".to_string();
    }

    let mut out = format!("{} | {} shift report(s)\n", style.store_name, reports.len());
    for report in reports {
        out.push_str(&format!(
            "{}  {}  sold {:>4}  revenue {:>10}  cash {} -> {}  by {}\n",
            report.end_time.format("%Y-%m-%d %H:%M"),
            short_id(&report.shift_id),
            report.total_sold,
            style.money(report.total_revenue()),
            style.money(report.opening_cash()),
            style.money(report.closing_cash()),
            report.operator_name().unwrap_or("unknown")
        ));
    }
    out
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut cut: String = name.chars().take(width - 1).collect();
        cut.push('~');
        cut
    }
}
