//! # CLI Commands
//!
//! Each subcommand maps onto one [`BakeryStore`] call and renders its
//! result as text.
//!
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (dispatch + output)
//! └── args.rs     ◄─── clap definition and value parsers
//!
//! hearth produce 13 20
//!        │
//!        ▼
//! Cli::parse_args ──► Command::Produce ──► store.add_production("13", 20)
//!                                          │
//!                                          ▼
//!                           "Produced 20 × MONAY" (+ queue warning)
//! ```

mod args;

pub use args::{Cli, Command, ItemCommand, Parsed};

use hearth_core::{CatalogItem, CoreError, LedgerKind, NewCatalogItem};

use crate::error::AppError;
use crate::report::{render_report_history, render_shift_sheet, ReportStyle};
use crate::store::{BakeryStore, Committed, Durability};

/// Runs one command against the store and returns what to print.
pub async fn execute(
    store: &BakeryStore,
    command: Command,
    style: &ReportStyle,
    history_limit: u32,
) -> Result<String, AppError> {
    let output = match command {
        // ---------------------------------------------------------------------
        // Queries
        // ---------------------------------------------------------------------
        Command::Items { action: None } => {
            let catalog = store.catalog();
            let mut out = String::new();
            for item in catalog.items() {
                out.push_str(&item_line(item, style));
                out.push('\n');
            }
            out.push_str(&format!("{} item(s)", catalog.len()));
            out
        }
        Command::Items {
            action: Some(action),
        } => catalog_command(store, action, style).await?,
        Command::Summary => {
            render_shift_sheet(&store.summary(), &store.shift(), style)
                .trim_end()
                .to_string()
        }
        Command::Entries => entries(store),
        Command::History { limit } => {
            let reports = store.recent_reports(limit.unwrap_or(history_limit)).await?;
            render_report_history(&reports, style).trim_end().to_string()
        }

        // ---------------------------------------------------------------------
        // Lifecycle
        // ---------------------------------------------------------------------
        Command::Start(args) => {
            let committed = store.start_shift(args.opening()).await?;
            let message = format!(
                "Shift {} opened with {} in the drawer",
                committed.value.id,
                committed.value.opening_cash().format_with(&style.currency_symbol)
            );
            with_durability(&committed, message)
        }
        Command::Prefill => {
            let committed = store.prefill_ending_inventory().await?;
            let message = format!("Prefilled {} ending count(s)", committed.value.len());
            with_durability(&committed, message)
        }
        Command::Count { item_id, count } => {
            let committed = store.set_ending_inventory(&item_id, count).await?;
            let message = format!("Ending count for {} set to {}", item_name(store, &item_id), count);
            with_durability(&committed, message)
        }
        Command::Uncount { item_id } => {
            let committed = store.clear_ending_inventory(&item_id).await?;
            let message = if committed.value {
                format!("Ending count for {} cleared", item_name(store, &item_id))
            } else {
                format!("{} had no ending count", item_name(store, &item_id))
            };
            with_durability(&committed, message)
        }
        Command::End { closing_cash_cents } => {
            let committed = store.end_shift(closing_cash_cents).await?;
            let report = &committed.value;
            let message = format!(
                "Shift {} closed: {} sold, revenue {}, drawer {} -> {}",
                report.shift_id,
                report.total_sold,
                report.total_revenue().format_with(&style.currency_symbol),
                report.opening_cash().format_with(&style.currency_symbol),
                report.closing_cash().format_with(&style.currency_symbol),
            );
            with_durability(&committed, message)
        }

        // ---------------------------------------------------------------------
        // Ledgers
        // ---------------------------------------------------------------------
        Command::Produce { item_id, quantity } => {
            let committed = store.add_production(&item_id, quantity).await?;
            let message = format!("Produced {} × {}", quantity, item_name(store, &item_id));
            with_durability(&committed, message)
        }
        Command::Sell { item_id, quantity } => {
            let committed = store.add_sale(&item_id, quantity).await?;
            let message = format!("Sold {} × {}", quantity, item_name(store, &item_id));
            with_durability(&committed, message)
        }
        Command::Discharge(args) => {
            let committed = store
                .add_discharge(&args.item_id, args.quantity, args.reason, args.notes())
                .await?;
            let message = format!(
                "Discharged {} × {} ({})",
                args.quantity,
                item_name(store, &args.item_id),
                args.reason
            );
            with_durability(&committed, message)
        }
        Command::SetProduction { item_id, quantity } => {
            let committed = store.set_production_quantity(&item_id, quantity).await?;
            let message = format!("Production of {} set to {}", item_name(store, &item_id), quantity);
            with_durability(&committed, message)
        }
        Command::SetSales { item_id, quantity } => {
            let committed = store.set_sales_quantity(&item_id, quantity).await?;
            let message = format!("Sales of {} set to {}", item_name(store, &item_id), quantity);
            with_durability(&committed, message)
        }
        Command::SetDischarge(args) => {
            let committed = store
                .set_discharge_quantity(&args.item_id, args.quantity, args.reason, args.notes())
                .await?;
            let message = format!(
                "Discharges of {} set to {}",
                item_name(store, &args.item_id),
                args.quantity
            );
            with_durability(&committed, message)
        }
        Command::Remove { kind, entry_id } => {
            let committed = store.remove_entry(kind, &entry_id).await?;
            with_durability(&committed, format!("{} entry {} removed", kind, entry_id))
        }
    };

    Ok(output)
}

async fn catalog_command(
    store: &BakeryStore,
    action: ItemCommand,
    style: &ReportStyle,
) -> Result<String, AppError> {
    let output = match action {
        ItemCommand::Add(args) => {
            let committed = store
                .add_item(NewCatalogItem {
                    id: args.id,
                    name: args.name,
                    category: args.category,
                    unit: args.unit,
                    cost_cents: args.cost,
                    price_cents: args.price,
                })
                .await?;
            let message = format!("Added {}", item_line(&committed.value, style));
            with_durability(&committed, message)
        }
        ItemCommand::Update(args) => {
            let current = store
                .catalog()
                .get(&args.item_id)
                .cloned()
                .ok_or_else(|| CoreError::UnknownItem(args.item_id.clone()))?;
            let committed = store
                .update_item(CatalogItem {
                    id: current.id,
                    name: args.name.unwrap_or(current.name),
                    category: args.category.unwrap_or(current.category),
                    unit: args.unit.unwrap_or(current.unit),
                    cost_cents: args.cost.unwrap_or(current.cost_cents),
                    price_cents: args.price.unwrap_or(current.price_cents),
                })
                .await?;
            let message = format!("Updated {}", item_line(&committed.value, style));
            with_durability(&committed, message)
        }
        ItemCommand::Remove { item_id } => {
            let committed = store.remove_item(&item_id).await?;
            let message = format!("Removed {} ({})", committed.value.name, committed.value.id);
            with_durability(&committed, message)
        }
        ItemCommand::Reset => {
            let committed = store.reset_catalog().await?;
            let message = format!("Catalog reset to {} default item(s)", store.catalog().len());
            with_durability(&committed, message)
        }
    };

    Ok(output)
}

fn item_line(item: &CatalogItem, style: &ReportStyle) -> String {
    format!(
        "{:<38} {:<28} {:<9} {:>5} cost {:>9}  price {:>9}",
        item.id,
        item.name,
        item.category.as_str(),
        item.unit,
        item.cost().format_with(&style.currency_symbol),
        item.price().format_with(&style.currency_symbol),
    )
}

fn with_durability<T>(committed: &Committed<T>, message: String) -> String {
    match &committed.durability {
        Durability::Saved => message,
        Durability::Queued { pending, error } => format!(
            "{}\nwarning: not saved yet ({} write(s) queued): {}",
            message, pending, error
        ),
    }
}

fn item_name(store: &BakeryStore, item_id: &str) -> String {
    store
        .catalog()
        .get(item_id)
        .map(|item| item.name.clone())
        .unwrap_or_else(|| item_id.to_string())
}

fn entries(store: &BakeryStore) -> String {
    let shift = store.shift();
    let catalog = store.catalog();
    let name = |id: &str| {
        catalog
            .get(id)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| format!("<{}>", id))
    };

    let mut out = format!("Shift {} ({})\n", shift.id, shift.status);
    let mut line = |kind: LedgerKind, id: &str, item_id: &str, quantity: i64, extra: String| {
        out.push_str(&format!(
            "{:<10} {:<36} {:<28} {:>5}{}\n",
            kind.as_str(),
            id,
            name(item_id),
            quantity,
            extra
        ));
    };

    for e in &shift.production {
        line(LedgerKind::Production, &e.id, &e.item_id, e.quantity, String::new());
    }
    for e in &shift.sales {
        line(LedgerKind::Sale, &e.id, &e.item_id, e.quantity, String::new());
    }
    for e in &shift.discharges {
        let extra = match &e.notes {
            Some(notes) => format!("  {}: {}", e.reason, notes),
            None => format!("  {}", e.reason),
        };
        line(LedgerKind::Discharge, &e.id, &e.item_id, e.quantity, extra);
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::store::{MemoryBackend, StoreSettings};
    use hearth_core::Operator;
    use std::sync::Arc;
    use std::time::Duration;

    async fn store() -> (Arc<MemoryBackend>, BakeryStore) {
        let backend = Arc::new(MemoryBackend::new());
        let settings = StoreSettings {
            max_attempts: 1,
            base_backoff: Duration::from_millis(1),
        };
        let store = BakeryStore::open(backend.clone(), settings).await.unwrap();
        store.sign_in(Operator::new("ana", "Ana"));
        (backend, store)
    }

    async fn run(store: &BakeryStore, words: &[&str]) -> Result<String, AppError> {
        match Cli::parse_args(words.iter().map(|s| s.to_string()))? {
            Parsed::Run(cli) => execute(store, cli.command, &ReportStyle::default(), 20).await,
            Parsed::Info(text) => Ok(text),
        }
    }

    #[tokio::test]
    async fn test_shift_from_the_command_line() {
        let (_backend, store) = store().await;

        let out = run(&store, &["start", "--cash", "1000", "13=10"]).await.unwrap();
        assert!(out.ends_with("opened with $1000.00 in the drawer"));

        assert_eq!(run(&store, &["produce", "13", "20"]).await.unwrap(), "Produced 20 × MONAY");
        run(&store, &["discharge", "13", "2", "expired"]).await.unwrap();
        run(&store, &["count", "13", "5"]).await.unwrap();

        let summary = run(&store, &["summary"]).await.unwrap();
        assert!(summary.contains("Revenue:            $115.00"));

        let entries = run(&store, &["entries"]).await.unwrap();
        assert!(entries.contains("Production"));
        assert!(entries.contains("Expired"));

        let out = run(&store, &["end", "2115"]).await.unwrap();
        assert!(out.contains("23 sold, revenue $115.00"));

        let history = run(&store, &["history"]).await.unwrap();
        assert!(history.contains("by Ana"));
    }

    #[tokio::test]
    async fn test_domain_errors_become_coded() {
        let (_backend, store) = store().await;

        let err = run(&store, &["produce", "13", "1"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ShiftClosed);

        run(&store, &["start"]).await.unwrap();
        let err = run(&store, &["sell", "nope", "1"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        let err = run(&store, &["start"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[tokio::test]
    async fn test_unauthorized_without_operator() {
        let (_backend, store) = store().await;
        store.sign_out();

        let err = run(&store, &["start"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        // Queries still run
        assert!(run(&store, &["items"]).await.unwrap().ends_with("31 item(s)"));
    }

    #[tokio::test]
    async fn test_queued_write_is_reported() {
        let (backend, store) = store().await;
        run(&store, &["start"]).await.unwrap();

        backend.fail_writes(1);
        let out = run(&store, &["sell", "1", "2"]).await.unwrap();
        assert!(out.starts_with("Sold 2 × CHOCO BREAD\nwarning: not saved yet (1 write(s) queued)"));
    }

    #[tokio::test]
    async fn test_catalog_from_the_command_line() {
        let (_backend, store) = store().await;

        let out = run(
            &store,
            &["items", "add", "UBE ROLL", "--category", "pastry", "--cost", "4", "--price", "9.50", "--id", "ube"],
        )
        .await
        .unwrap();
        assert!(out.starts_with("Added ube"));
        assert!(out.contains("$9.50"));
        assert_eq!(store.catalog().len(), 32);

        run(&store, &["items", "update", "ube", "--price", "10", "--unit", "roll"])
            .await
            .unwrap();
        let ube = store.catalog().get("ube").cloned().unwrap();
        assert_eq!((ube.price_cents, ube.cost_cents), (1_000, 400));
        assert_eq!((ube.name.as_str(), ube.unit.as_str()), ("UBE ROLL", "roll"));

        let err = run(&store, &["items", "update", "nope", "--price", "1"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let out = run(&store, &["items", "remove", "ube"]).await.unwrap();
        assert_eq!(out, "Removed UBE ROLL (ube)");
        assert!(store.catalog().get("ube").is_none());

        run(&store, &["start"]).await.unwrap();
        run(&store, &["produce", "13", "4"]).await.unwrap();
        let err = run(&store, &["items", "remove", "13"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(store.catalog().get("13").is_some());
    }

    #[tokio::test]
    async fn test_oversized_quantity_is_rejected() {
        let (_backend, store) = store().await;
        run(&store, &["start"]).await.unwrap();

        let huge = (i64::MAX / 100).to_string();
        let err = run(&store, &["produce", "13", &huge]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(store.shift().production.is_empty());
        assert!(run(&store, &["summary"]).await.is_ok());
    }
}
