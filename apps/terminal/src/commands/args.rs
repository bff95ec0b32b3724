//! Command-line definition for the `hearth` binary.
//!
//! Global options come first, then one subcommand:
//!
//! ```text
//! hearth [-c PATH] [-d PATH] [-o NAME] <COMMAND>
//!
//! queries     items | summary | entries | history [N]
//! lifecycle   start | prefill | count | uncount | end
//! ledgers     produce | sell | discharge | set-* | remove
//! catalog     items add | items update | items remove | items reset
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use hearth_core::{Category, DischargeReason, LedgerKind, ShiftOpening};

use crate::error::AppError;

/// Hearth shift terminal.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "hearth", version, arg_required_else_help = true)]
pub struct Cli {
    /// Config file (default: platform config dir/hearth.toml).
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Database file, overrides the config.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Operator to sign in as, overrides HEARTH_OPERATOR.
    #[arg(short, long, global = true, value_name = "NAME")]
    pub operator: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// What a successful parse asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Cli),
    /// `--help` or `--version`: print the text and stop.
    Info(String),
}

impl Cli {
    /// Parses everything after the program name.
    pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Parsed, AppError> {
        let argv = std::iter::once("hearth".to_string()).chain(args);
        match Cli::try_parse_from(argv) {
            Ok(cli) => Ok(Parsed::Run(cli)),
            Err(err) if !err.use_stderr() => Ok(Parsed::Info(err.to_string())),
            Err(err) => Err(AppError::usage(err.to_string().trim_end())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------
    /// List the catalog, or change it.
    Items {
        #[command(subcommand)]
        action: Option<ItemCommand>,
    },

    /// Inventory sheet and totals for the current shift.
    #[command(visible_alias = "status")]
    Summary,

    /// Ledger entries of the current shift, with ids.
    Entries,

    /// Archived shift reports, newest first.
    History {
        /// How many reports (default from hearth.toml).
        limit: Option<u32>,
    },

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------
    /// Open a shift.
    Start(StartArgs),

    /// Fill ending counts with the expected values.
    Prefill,

    /// Record the physical ending count of an item.
    Count { item_id: String, count: i64 },

    /// Clear an item's ending count.
    Uncount { item_id: String },

    /// Close the shift and archive its report.
    End {
        /// Cash in the drawer, like 2115 or 2115.50.
        #[arg(value_parser = parse_cents, value_name = "CASH")]
        closing_cash_cents: i64,
    },

    // -------------------------------------------------------------------------
    // Ledgers
    // -------------------------------------------------------------------------
    /// Log units produced.
    Produce { item_id: String, quantity: i64 },

    /// Log units sold at the counter.
    Sell { item_id: String, quantity: i64 },

    /// Write off units.
    Discharge(DischargeArgs),

    /// Replace all production of an item with one entry (0 clears).
    SetProduction { item_id: String, quantity: i64 },

    /// Replace all sales of an item with one entry (0 clears).
    SetSales { item_id: String, quantity: i64 },

    /// Replace all discharges of an item with one entry (0 clears).
    SetDischarge(DischargeArgs),

    /// Remove one ledger entry by id.
    Remove {
        /// production, sale or discharge.
        #[arg(value_parser = parse_kind)]
        kind: LedgerKind,
        entry_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ItemCommand {
    /// Add a catalog item.
    Add(NewItemArgs),

    /// Change fields of a catalog item; omitted fields keep their value.
    Update(UpdateItemArgs),

    /// Remove an item the current shift does not use.
    Remove { item_id: String },

    /// Replace the catalog with the default list.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct StartArgs {
    /// Opening cash, like 1000 or 1000.50.
    #[arg(long, value_parser = parse_cents, default_value = "0")]
    pub cash: i64,

    /// Verified beginning counts that override the carried-forward ones.
    #[arg(value_parser = parse_count, value_name = "ITEM=COUNT")]
    pub counts: Vec<(String, i64)>,
}

impl StartArgs {
    pub fn opening(&self) -> ShiftOpening {
        self.counts
            .iter()
            .fold(ShiftOpening::with_cash(self.cash), |opening, (item_id, count)| {
                opening.count(item_id.clone(), *count)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DischargeArgs {
    pub item_id: String,
    pub quantity: i64,

    /// expired, damaged, quality or other.
    #[arg(value_parser = parse_reason)]
    pub reason: DischargeReason,

    /// Free text, the rest of the line.
    #[arg(trailing_var_arg = true)]
    pub notes: Vec<String>,
}

impl DischargeArgs {
    pub fn notes(&self) -> Option<String> {
        if self.notes.is_empty() {
            None
        } else {
            Some(self.notes.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct NewItemArgs {
    pub name: String,

    #[arg(long, value_parser = parse_category)]
    pub category: Category,

    #[arg(long, default_value = "pcs")]
    pub unit: String,

    /// Unit cost, like 2 or 2.50.
    #[arg(long, value_parser = parse_cents)]
    pub cost: i64,

    /// Unit selling price.
    #[arg(long, value_parser = parse_cents)]
    pub price: i64,

    /// Explicit id; a UUID is generated when omitted.
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct UpdateItemArgs {
    pub item_id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,

    #[arg(long)]
    pub unit: Option<String>,

    #[arg(long, value_parser = parse_cents)]
    pub cost: Option<i64>,

    #[arg(long, value_parser = parse_cents)]
    pub price: Option<i64>,
}

impl Command {
    /// Whether the command changes state and so needs a signed-in operator.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Command::Items { action: None }
                | Command::Summary
                | Command::Entries
                | Command::History { .. }
        )
    }
}

// =============================================================================
// Value Parsers
// =============================================================================

/// Parses `1000`, `1000.5` or `1000.50` into cents.
pub fn parse_cents(s: &str) -> Result<i64, String> {
    let invalid = || format!("not an amount: {}", s);
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (major, minor) = digits.split_once('.').unwrap_or((digits, ""));
    if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if minor.len() > 2 || !minor.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let major: i64 = major.parse().map_err(|_| invalid())?;
    let minor: i64 = match minor.len() {
        0 => 0,
        1 => minor.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => minor.parse().map_err(|_| invalid())?,
    };

    let cents = major
        .checked_mul(100)
        .and_then(|c| c.checked_add(minor))
        .ok_or_else(invalid)?;
    Ok(if negative { -cents } else { cents })
}

/// `ITEM=COUNT`, e.g. `13=10`.
pub fn parse_count(s: &str) -> Result<(String, i64), String> {
    let (item_id, count) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ITEM=COUNT, got {}", s))?;
    let count = count
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("not a whole number: {}", count))?;
    Ok((item_id.to_string(), count))
}

pub fn parse_reason(s: &str) -> Result<DischargeReason, String> {
    match s.to_ascii_lowercase().as_str() {
        "expired" => Ok(DischargeReason::Expired),
        "damaged" => Ok(DischargeReason::Damaged),
        "quality" | "quality_issue" | "quality-issue" => Ok(DischargeReason::QualityIssue),
        "other" => Ok(DischargeReason::Other),
        _ => Err(format!(
            "unknown discharge reason {} (expired, damaged, quality, other)",
            s
        )),
    }
}

pub fn parse_kind(s: &str) -> Result<LedgerKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "production" | "prod" => Ok(LedgerKind::Production),
        "sale" | "sales" => Ok(LedgerKind::Sale),
        "discharge" | "discharges" => Ok(LedgerKind::Discharge),
        _ => Err(format!("unknown ledger {}", s)),
    }
}

pub fn parse_category(s: &str) -> Result<Category, String> {
    Category::ALL
        .into_iter()
        .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| {
            let names: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
            format!("unknown category {} ({})", s, names.join(", "))
        })
}
