//! JC Closet CLI - session-store migrations and previews.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! jc-cli migrate storefront
//!
//! # Create the admin.session table
//! jc-cli migrate admin
//!
//! # Both
//! jc-cli migrate all
//!
//! # Build the Sankey graph from an exported user-flow report
//! jc-cli flow preview user-flow.json --max-nodes 20
//!
//! # Show what shoppers would pay under a promotion
//! jc-cli promo preview --price 12500 --kind discount --value 20 \
//!     --start 2026-11-01T00:00:00Z --end 2026-11-30T23:59:59Z
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use jc_closet_core::CurrencyCode;
use rust_decimal::Decimal;

mod commands;

use commands::promo::PromoKind;

#[derive(Parser)]
#[command(name = "jc-cli")]
#[command(author, version, about = "JC Closet CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create session-store tables
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// User-flow graph tools
    Flow {
        #[command(subcommand)]
        action: FlowAction,
    },
    /// Promotion tools
    Promo {
        #[command(subcommand)]
        action: PromoAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Storefront sessions (`STOREFRONT_DATABASE_URL`)
    Storefront,
    /// Admin sessions (`ADMIN_DATABASE_URL`)
    Admin,
    /// Both stores
    All,
}

#[derive(Subcommand)]
enum FlowAction {
    /// Build the Sankey graph from a JSON export of user-flow paths
    Preview {
        /// `{"paths": [...]}` or a bare array of `{path, count}`
        file: PathBuf,

        /// Drop paths with fewer steps
        #[arg(long)]
        min_steps: Option<usize>,

        /// Cap on distinct pages
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Print the graph as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PromoAction {
    /// Resolve the display price for a set of promotion terms
    Preview {
        /// Base price
        #[arg(long)]
        price: Decimal,

        #[arg(long, value_enum)]
        kind: PromoKind,

        /// Percentage for a discount, or the promo price
        #[arg(long)]
        value: Decimal,

        /// RFC 3339 start
        #[arg(long)]
        start: DateTime<Utc>,

        /// RFC 3339 end
        #[arg(long)]
        end: DateTime<Utc>,

        /// Evaluate at this time instead of now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Treat the promotion as switched off
        #[arg(long)]
        disabled: bool,

        #[arg(long, default_value = "KES")]
        currency: CurrencyCode,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Flow { action } => match action {
            FlowAction::Preview {
                file,
                min_steps,
                max_nodes,
                json,
            } => commands::flow::preview(&file, min_steps, max_nodes, json)?,
        },
        Commands::Promo { action } => match action {
            PromoAction::Preview {
                price,
                kind,
                value,
                start,
                end,
                at,
                disabled,
                currency,
            } => {
                let terms = commands::promo::terms(kind, value, start, end, !disabled);
                commands::promo::preview(price, &terms, at.unwrap_or_else(Utc::now), currency);
            }
        },
    }
    Ok(())
}
