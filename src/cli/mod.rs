use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::application::OfflineQueue;
use crate::config::{DEFAULT_CONFIG_PATH, Settings};
use crate::domain::{
    BudgetThresholds, Category, ExpenseDraft, OfflineExpense, PaymentMethod, evaluate_with,
    format_cents, parse_cents, percentage_used,
};
use crate::storage::SqliteStore;

/// Spendsync - offline expense queue and budget warnings
#[derive(Parser)]
#[command(name = "spendsync")]
#[command(about = "Inspect the offline expense queue and check spending against a budget")]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Local store file, overrides the settings file
    #[arg(short, long)]
    pub database: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a month's spending against its budget
    Evaluate {
        /// Total spent this month (e.g., "960.00")
        spent: String,

        /// Budget ceiling for the month
        ceiling: String,

        /// Alert at 75% used instead of the configured alert threshold
        #[arg(long)]
        intended: bool,

        /// Print the warning as JSON
        #[arg(long)]
        json: bool,
    },

    /// Offline queue commands
    #[command(subcommand)]
    Queue(QueueCommands),

    /// Print the effective settings
    Config,
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// Save an expense to the offline queue
    Add {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Food, Transport, Shopping, Bills, Entertainment, Health, Education or Other
        #[arg(short, long, default_value = "Other")]
        category: String,

        /// Cash, Card, UPI, Online or Other
        #[arg(short, long, default_value = "Cash")]
        payment: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Date of the expense (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// List queued expenses in submission order
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove every queued expense
    Clear,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut settings = Settings::load(&self.config)?;
        if let Some(database) = self.database {
            settings.database = database;
        }

        match self.command {
            Commands::Evaluate {
                spent,
                ceiling,
                intended,
                json,
            } => {
                let spent =
                    parse_cents(&spent).context("Invalid spent amount. Use '50.00' or '50'")?;
                let ceiling =
                    parse_cents(&ceiling).context("Invalid ceiling. Use '1000.00' or '1000'")?;
                anyhow::ensure!(spent >= 0 && ceiling >= 0, "Amounts cannot be negative");

                let thresholds = if intended {
                    BudgetThresholds::intended()
                } else {
                    settings.thresholds
                };
                let warning = evaluate_with(spent, ceiling, &thresholds);

                if json {
                    println!("{}", serde_json::to_string_pretty(&warning)?);
                    return Ok(());
                }

                println!(
                    "Spent {} of {} ({:.1}% used, {} remaining)",
                    format_cents(spent),
                    format_cents(ceiling),
                    percentage_used(spent, ceiling),
                    format_cents(ceiling - spent)
                );
                match warning {
                    Some(w) => println!("[{}] {}", w.tier, w.message),
                    None => println!("No warning"),
                }
            }

            Commands::Queue(queue_cmd) => {
                let store = SqliteStore::init(&settings.database).await?;
                let queue = OfflineQueue::with_key(store, settings.queue_key.clone());
                run_queue_command(&queue, queue_cmd).await?;
            }

            Commands::Config => {
                print!("{}", toml::to_string_pretty(&settings)?);
            }
        }

        Ok(())
    }
}

async fn run_queue_command(queue: &OfflineQueue<SqliteStore>, cmd: QueueCommands) -> Result<()> {
    match cmd {
        QueueCommands::Add {
            amount,
            category,
            payment,
            description,
            date,
        } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
            let category = Category::from_str(&category)
                .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", category))?;
            let payment_method = PaymentMethod::from_str(&payment)
                .ok_or_else(|| anyhow::anyhow!("Unknown payment method: {}", payment))?;
            let date = match date {
                Some(date_str) => parse_date(&date_str).with_context(|| {
                    format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                })?,
                None => Utc::now(),
            };

            let mut draft = ExpenseDraft::new(amount_cents, category, payment_method, date);
            draft.description = description;
            draft.validate()?;

            let entry = queue.enqueue(draft).await?;
            println!(
                "Queued {} {} ({})",
                format_cents(entry.draft.amount_cents),
                entry.draft.category,
                entry.id
            );
        }

        QueueCommands::List { json } => {
            let entries = queue.list_queued().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_queue(&entries);
            }
        }

        QueueCommands::Clear => {
            let count = queue.len().await;
            queue.clear().await?;
            println!("Removed {} queued expenses", count);
        }
    }

    Ok(())
}

fn print_queue(entries: &[OfflineExpense]) {
    if entries.is_empty() {
        println!("Offline queue is empty.");
        return;
    }

    println!(
        "{:<12} {:>12} {:<14} {:<8} {:<32}",
        "DATE", "AMOUNT", "CATEGORY", "PAYMENT", "ID"
    );
    println!("{}", "-".repeat(82));
    for entry in entries {
        println!(
            "{:<12} {:>12} {:<14} {:<8} {:<32}",
            entry.draft.date.format("%Y-%m-%d"),
            format_cents(entry.draft.amount_cents),
            entry.draft.category.as_str(),
            entry.draft.payment_method.as_str(),
            entry.id
        );
        if let Some(desc) = &entry.draft.description {
            println!("{:<12} {}", "", desc);
        }
    }
    println!("{}", "-".repeat(82));
    println!("{} pending", entries.len());
}

/// Parse a YYYY-MM-DD date as midnight UTC.
fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    let naive_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;

    let naive_datetime = naive_date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;

    Ok(DateTime::from_naive_utc_and_offset(naive_datetime, Utc))
}
