use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use pocket_ledger::cache::AppState;
use pocket_ledger::config::{AppConfig, load_app_configuration};
use pocket_ledger::core::format::format_currency;
use pocket_ledger::core::stats::{self, ProjectionPeriod, StatsPeriod};
use pocket_ledger::core::store::Store;
use pocket_ledger::entities::transaction::TransactionType;
use pocket_ledger::errors::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pocket-ledger",
    version,
    about = "Personal income and expense ledger"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show totals, top categories and trends for a period
    Summary {
        /// Look-back window: 7d, 30d, 90d or 1y
        #[arg(short, long, default_value = "30d")]
        period: StatsPeriod,
    },
    /// List categories grouped by type
    Categories,
    /// Write the whole ledger to a JSON file
    Export {
        /// Destination file
        file: PathBuf,
    },
    /// Merge a JSON export into the ledger
    Import {
        /// Source file
        file: PathBuf,
    },
    /// Delete everything except the default categories
    Reset,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 1. Load .env before anything reads the environment
    dotenv().ok();

    // 2. Configuration, then tracing with the configured fallback filter
    let config = match load_app_configuration() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();
    info!(database_url = %config.database_url, "starting");

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    let store = Store::connect(&config.database_url).await?;
    let state = AppState::new(store);
    state.initialize().await?;

    match command {
        Commands::Summary { period } => print_summary(&state, period, &config.currency).await,
        Commands::Categories => {
            for kind in [TransactionType::Expense, TransactionType::Income] {
                println!("{kind}:");
                for c in state.categories_for(kind).await {
                    let marker = if c.is_default { "" } else { " (custom)" };
                    println!("  {} {:<16} {}{marker}", c.icon, c.name, c.id);
                }
            }
        }
        Commands::Export { file } => {
            let document = state.export_json().await?;
            std::fs::write(&file, document)?;
            println!("Exported to {}", file.display());
        }
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let report = state.import_json(&text).await?;
            println!(
                "Imported {} transactions, {} categories, {} budgets, {} preferences",
                report.transactions, report.categories, report.budgets, report.preferences
            );
            for failure in &report.failures {
                println!(
                    "  failed {} {}: {}",
                    failure.entity, failure.id, failure.message
                );
            }
        }
        Commands::Reset => {
            state.reset().await?;
            println!("Ledger cleared; default categories kept");
        }
    }
    Ok(())
}

async fn print_summary(state: &AppState, period: StatsPeriod, currency: &str) {
    let data = state.snapshot().await;
    let range = period.range();
    let money = |amount: f64| format_currency(amount, currency);

    println!("Last {}", period.as_str());
    println!(
        "  income {}  expense {}  balance {}",
        money(stats::total_income(&data.transactions, Some(&range))),
        money(stats::total_expense(&data.transactions, Some(&range))),
        money(stats::balance(&data.transactions, Some(&range))),
    );

    let slices = stats::expense_breakdown(&data.transactions, &data.categories, Some(&range), 8);
    if !slices.is_empty() {
        println!("Top categories");
        for s in slices {
            println!("  {:<16} {:>12} {:>5.1}%", s.name, money(s.amount), s.percentage);
        }
    }

    let trends = stats::monthly_trends(&data.transactions, period.trend_months());
    if !trends.is_empty() {
        println!("Monthly");
        for m in &trends {
            println!(
                "  {}  +{}  -{}  = {}",
                m.month,
                money(m.income),
                money(m.expense),
                money(m.balance)
            );
        }
        let averages = stats::monthly_averages(&trends);
        println!(
            "  average  +{}  -{}",
            money(averages.income),
            money(averages.expense)
        );
    }

    let projection = stats::spending_projection(&data.transactions, ProjectionPeriod::Monthly);
    println!(
        "This month: spent {} in {} days, on track for {} ({} days left)",
        money(projection.spent),
        projection.days_elapsed,
        money(projection.projected_total),
        projection.days_remaining
    );
}
