//! Agent Helper CLI - store listing, export, reporting and bulk edits.
//!
//! # Usage
//!
//! ```bash
//! # Show the connected shop
//! agent-cli shop
//!
//! # List active products matching a search term
//! agent-cli products list --status active --search salt --limit 20
//!
//! # Export every order from this year to CSV
//! agent-cli export orders --output orders.csv --created-after 2024-01-01
//!
//! # Sales report for the last 7 days
//! agent-cli report sales --days 7
//!
//! # Bulk product updates from a JSON file
//! agent-cli bulk products --input updates.json --batch-size 5
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE_DOMAIN` - Store domain (`my-store.myshopify.com`)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token from the install flow
//! - `SHOPIFY_API_VERSION` - Admin API version (default `2024-01`)
//! - `RUST_LOG` - Log filter (default `warn`)
//! - `LOG_FORMAT` - `json` for JSON logs

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_helper_admin::batch::BatchOptions;
use agent_helper_admin::shopify::{EntityKind, ListQuery, SearchFilter};

mod commands;
mod error;

use error::CliError;

#[derive(Parser)]
#[command(name = "agent-cli")]
#[command(author, version, about = "Agent Helper store management tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show shop information
    Shop,
    /// Work with products
    Products {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Work with orders
    Orders {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Work with customers
    Customers {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Work with inventory items
    Inventory {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Export an entity list to CSV
    Export {
        /// Entity to export
        entity: EntityArg,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Stop after this many rows (default: everything)
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print an analytics report
    Report {
        #[command(subcommand)]
        report: ReportKind,
    },
    /// Check store health (exit code 1 when unhealthy)
    Health,
    /// Apply bulk mutations from a JSON file (exit code 1 if any item fails)
    Bulk {
        #[command(subcommand)]
        target: BulkTarget,
    },
}

#[derive(Subcommand)]
enum ListAction {
    /// List entities as JSON
    List {
        /// Maximum number of entities
        #[arg(short, long, default_value_t = 50)]
        limit: usize,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Subcommand)]
enum ReportKind {
    /// Revenue, order count and top products
    Sales {
        /// Look-back window in days
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },
    /// Stock levels and inventory value
    Inventory,
}

#[derive(Subcommand)]
enum BulkTarget {
    /// Update products from `[{"id": .., "input": {..}}]`
    Products {
        /// JSON input file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        pacing: PacingArgs,
    },
    /// Adjust available quantities from `[{"inventoryItemId": .., "locationId": .., "delta": ..}]`
    Inventory {
        /// JSON input file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        pacing: PacingArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EntityArg {
    Products,
    Orders,
    Customers,
    Inventory,
}

impl From<EntityArg> for EntityKind {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::Products => Self::Products,
            EntityArg::Orders => Self::Orders,
            EntityArg::Customers => Self::Customers,
            EntityArg::Inventory => Self::InventoryItems,
        }
    }
}

/// Search flags shared by `list` and `export`.
#[derive(Debug, Default, Args)]
struct FilterArgs {
    /// Filter by status (`active`, `draft`, `archived`, ...)
    #[arg(long)]
    status: Option<String>,

    /// Free-text search term
    #[arg(long)]
    search: Option<String>,

    /// Only entities created on or after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    created_after: Option<chrono::NaiveDate>,

    /// Only entities created on or before this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    created_before: Option<chrono::NaiveDate>,

    /// Raw search clause appended as given
    #[arg(long)]
    query: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> SearchFilter {
        let mut filter = SearchFilter::new();
        if let Some(status) = &self.status {
            filter = filter.status(status);
        }
        if let Some(term) = &self.search {
            filter = filter.text(term);
        }
        if let Some(date) = self.created_after {
            filter = filter.created_after(date.to_string());
        }
        if let Some(date) = self.created_before {
            filter = filter.created_before(date.to_string());
        }
        if let Some(raw) = &self.query {
            filter = filter.raw(raw);
        }
        filter
    }

    fn to_query(&self, limit: Option<usize>) -> ListQuery {
        let query = ListQuery::default().with_filter(self.to_filter());
        match limit {
            Some(limit) => query.with_max_items(limit),
            None => query,
        }
    }
}

/// Pacing overrides for bulk commands.
#[derive(Debug, Default, Args)]
struct PacingArgs {
    /// Items dispatched concurrently per group
    #[arg(long)]
    batch_size: Option<usize>,

    /// Pause between groups in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl PacingArgs {
    fn options(&self, defaults: BatchOptions) -> BatchOptions {
        BatchOptions::new(
            self.batch_size.unwrap_or(defaults.batch_size),
            self.delay_ms
                .map_or(defaults.delay, std::time::Duration::from_millis),
        )
    }
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let client = commands::client()?;

    match cli.command {
        Commands::Shop => commands::shop::show(&client).await?,
        Commands::Products { action } => list(&client, EntityKind::Products, action).await?,
        Commands::Orders { action } => list(&client, EntityKind::Orders, action).await?,
        Commands::Customers { action } => list(&client, EntityKind::Customers, action).await?,
        Commands::Inventory { action } => {
            list(&client, EntityKind::InventoryItems, action).await?;
        }
        Commands::Export {
            entity,
            output,
            limit,
            filter,
        } => {
            commands::export::to_csv(&client, entity.into(), filter.to_query(limit), &output)
                .await?;
        }
        Commands::Report { report } => match report {
            ReportKind::Sales { days } => commands::report::sales(&client, days).await?,
            ReportKind::Inventory => commands::report::inventory(&client).await?,
        },
        Commands::Health => return commands::health::check(&client).await,
        Commands::Bulk { target } => {
            return match target {
                BulkTarget::Products { input, pacing } => {
                    commands::bulk::products(&client, &input, pacing.options(BatchOptions::PRODUCTS))
                        .await
                }
                BulkTarget::Inventory { input, pacing } => {
                    commands::bulk::inventory(
                        &client,
                        &input,
                        pacing.options(BatchOptions::INVENTORY),
                    )
                    .await
                }
            };
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn list(
    client: &agent_helper_admin::shopify::AdminClient,
    kind: EntityKind,
    action: ListAction,
) -> Result<(), CliError> {
    match action {
        ListAction::List { limit, filter } => {
            commands::list::print(client, kind, filter.to_query(Some(limit))).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::time::Duration;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_flags_build_filter() {
        let cli = Cli::try_parse_from([
            "agent-cli",
            "products",
            "list",
            "--status",
            "active",
            "--search",
            "sea salt",
            "--created-after",
            "2024-01-01",
            "--limit",
            "5",
        ])
        .unwrap();

        let Commands::Products {
            action: ListAction::List { limit, filter },
        } = cli.command
        else {
            panic!("expected products list");
        };
        assert_eq!(limit, 5);

        let query = filter.to_query(Some(limit));
        assert_eq!(query.max_items, Some(5));
        assert_eq!(
            query.filter.render().as_deref(),
            Some(r#"status:active "sea salt" created_at:>=2024-01-01"#)
        );
    }

    #[test]
    fn test_list_limit_defaults_to_fifty() {
        let cli = Cli::try_parse_from(["agent-cli", "orders", "list"]).unwrap();
        let Commands::Orders {
            action: ListAction::List { limit, filter },
        } = cli.command
        else {
            panic!("expected orders list");
        };
        assert_eq!(limit, 50);
        assert!(filter.to_filter().is_empty());
    }

    #[test]
    fn test_rejects_malformed_date() {
        let result =
            Cli::try_parse_from(["agent-cli", "orders", "list", "--created-before", "01/02/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_without_limit_fetches_everything() {
        let cli = Cli::try_parse_from([
            "agent-cli",
            "export",
            "inventory",
            "--output",
            "items.csv",
        ])
        .unwrap();
        let Commands::Export {
            entity,
            limit,
            filter,
            ..
        } = cli.command
        else {
            panic!("expected export");
        };
        assert_eq!(EntityKind::from(entity), EntityKind::InventoryItems);
        assert_eq!(filter.to_query(limit).max_items, None);
    }

    #[test]
    fn test_pacing_overrides_defaults() {
        let pacing = PacingArgs {
            batch_size: Some(3),
            delay_ms: None,
        };
        let options = pacing.options(BatchOptions::INVENTORY);
        assert_eq!(options.batch_size, 3);
        assert_eq!(options.delay, Duration::from_millis(2000));

        let options = PacingArgs::default().options(BatchOptions::PRODUCTS);
        assert_eq!(options, BatchOptions::PRODUCTS);
    }

    #[test]
    fn test_report_sales_days_default() {
        let cli = Cli::try_parse_from(["agent-cli", "report", "sales"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Report {
                report: ReportKind::Sales { days: 30 }
            }
        ));
    }
}
