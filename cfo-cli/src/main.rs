use anyhow::{Context, Result};
use cfo_core::{Category, Expense, Reminder, Store, check_amount};
use cfo_finance::{
    Categorizer, CategorizerConfig, Source, cash_flow_by_category, cash_runway, split_bills,
    total_spent,
};
use cfo_ingest::{ReceiptIntake, TesseractCli, today_in};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod config;
mod dashboard;
mod llm;
mod state;

use config::{Config, load_config};
use dashboard::{DashboardInput, format_runway, render_dashboard, render_split};
use llm::{ChatTurn, LlmClient};

/// `correct` text argument naming the most recent expense
const LAST_EXPENSE: &str = "-";

#[derive(Parser, Debug)]
#[command(
    name = "cfo",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CFO_BUILD_SHA"), ")"),
    about = "Receipt scanning, expense categorization and budget dashboards"
)]
struct Cli {
    /// Directory holding expenses.json, reminders.json and category_corrections.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// OCR a receipt image (PNG/JPEG), categorize it and save the expense
    Scan {
        image: PathBuf,

        /// Print the result without saving it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Categorize a piece of receipt text without saving anything
    Categorize { text: String },

    /// Remember the right category for a receipt text
    Correct {
        /// Receipt text to correct; `-` means the last scanned expense
        text: String,

        /// Category: Housing, Transport, Food, Education, Subscription or Misc
        category: String,
    },

    /// Expense commands
    Expenses {
        #[command(subcommand)]
        command: ExpensesCommand,
    },

    /// Payment reminder commands
    Reminders {
        #[command(subcommand)]
        command: RemindersCommand,
    },

    /// Totals, runway, category charts, insights, reminders and bill split
    Dashboard {
        /// Balance used for the runway (default: [dashboard].balance)
        #[arg(long)]
        balance: Option<f64>,

        /// Comma separated roommate names (default: [dashboard].roommates)
        #[arg(long)]
        roommates: Option<String>,
    },

    /// Equal split of all expenses between roommates and you
    Split {
        #[arg(long)]
        roommates: Option<String>,
    },

    /// Months the balance lasts at the current burn rate
    Runway {
        #[arg(long)]
        balance: Option<f64>,
    },

    /// Write all expenses to a CSV file
    Export {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Ask the model a what-if question about your spending
    Ask { question: String },

    /// Config file commands (~/.mini-cfo/config.toml)
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ExpensesCommand {
    /// List stored expenses, newest last
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
enum RemindersCommand {
    /// Add a payment reminder
    Add {
        name: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,

        #[arg(long, default_value_t = 0.0)]
        amount: f64,
    },

    /// List reminders
    List,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    debug!("{cli:?}");
    let cfg = load_config()?;
    let store = Store::new(cfg.data_dir(cli.data_dir)?);

    match cli.command {
        Command::Scan { image, dry_run } => scan(&cfg, &store, &image, dry_run),

        Command::Categorize { text } => {
            let categorizer = build_categorizer(&cfg, &store)?;
            let out = categorizer.categorize_and_analyze(&text);
            println!("Category: {}", out.category);
            println!("Insight:  {}", out.insight);
            println!("Source:   {}", describe_source(&out.source));
            Ok(())
        }

        Command::Correct { category, text } => {
            let category: Category = category.parse()?;
            let text = if text == LAST_EXPENSE {
                store
                    .load_expenses()?
                    .pop()
                    .map(|e| e.raw_text)
                    .context("no expenses stored yet; pass the receipt text")?
            } else {
                text
            };
            store.save_correction(&text, category)?;
            println!("Remembered {} for: {}", category, first_line(&text));
            Ok(())
        }

        Command::Expenses { command } => match command {
            ExpensesCommand::List { limit } => {
                let expenses = store.load_expenses()?;
                if expenses.is_empty() {
                    println!("No expenses yet. Scan receipts to get started!");
                    return Ok(());
                }
                let skip = expenses.len().saturating_sub(limit);
                for e in &expenses[skip..] {
                    println!(
                        "{} | {:<12} | ${:>9.2} | {}",
                        e.date,
                        e.category.label(),
                        e.amount,
                        first_line(&e.raw_text)
                    );
                }
                println!("\n{} of {} expenses", expenses.len() - skip, expenses.len());
                Ok(())
            }
        },

        Command::Reminders { command } => match command {
            RemindersCommand::Add { name, due, amount } => {
                let due = NaiveDate::parse_from_str(&due, "%Y-%m-%d")
                    .with_context(|| format!("invalid due date '{due}' (expected YYYY-MM-DD)"))?;
                check_amount(amount).context("invalid --amount")?;
                store.save_reminder(&Reminder::new(name, due, amount))?;
                println!("Reminder saved to {}", store.reminders_path().display());
                Ok(())
            }
            RemindersCommand::List => {
                let today = today_in(cfg.timezone()?);
                print!(
                    "{}",
                    dashboard::render_reminders(&store.load_reminders()?, today)
                );
                Ok(())
            }
        },

        Command::Dashboard { balance, roommates } => {
            let expenses = store.load_expenses()?;
            let reminders = store.load_reminders()?;
            let roommates = resolve_roommates(&cfg, roommates);
            let input = DashboardInput {
                expenses: &expenses,
                reminders: &reminders,
                roommates: &roommates,
                balance: balance.unwrap_or(cfg.dashboard.balance),
                income: cfg.dashboard.income,
                today: today_in(cfg.timezone()?),
            };
            print!("{}", render_dashboard(&input));
            Ok(())
        }

        Command::Split { roommates } => {
            let roommates = resolve_roommates(&cfg, roommates);
            let rows = split_bills(&store.load_expenses()?, &roommates);
            print!("{}", render_split(&rows));
            Ok(())
        }

        Command::Runway { balance } => {
            let balance = balance.unwrap_or(cfg.dashboard.balance);
            let months = cash_runway(&store.load_expenses()?, balance);
            println!("Cash runway at ${balance:.2}: {}", format_runway(months));
            Ok(())
        }

        Command::Export { csv } => {
            let expenses = store.load_expenses()?;
            export_csv(&expenses, &csv)?;
            println!("Wrote {} expenses to {}", expenses.len(), csv.display());
            Ok(())
        }

        Command::Ask { question } => {
            ask(&cfg, &store, &question);
            Ok(())
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(),
            ConfigCommand::Show => config::show_config(&cfg),
        },
    }
}

fn scan(cfg: &Config, store: &Store, image: &Path, dry_run: bool) -> Result<()> {
    let bytes = std::fs::read(image).with_context(|| format!("read {}", image.display()))?;
    let categorizer = build_categorizer(cfg, store)?;
    let date = today_in(cfg.timezone()?);

    let mut ocr = TesseractCli::new(&cfg.ocr.command);
    if let Some(lang) = &cfg.ocr.language {
        ocr = ocr.with_language(lang);
    }

    let (expense, source) = if dry_run {
        cfo_ingest::ImageKind::detect(&bytes)?;
        let text = cfo_ingest::TextExtractor::extract_text(&ocr, &bytes)?;
        cfo_ingest::build_expense(&text, &categorizer, date)
    } else {
        let out = ReceiptIntake::new(&ocr, &categorizer, store).ingest(&bytes, date)?;
        (out.expense, out.source)
    };

    println!("Receipt processed{}\n", if dry_run { " (dry run, not saved)" } else { "" });
    println!("OCR extracted:\n{}\n", expense.raw_text);
    println!("Category: {}", expense.category);
    println!("Amount:   ${:.2}", expense.amount);
    println!("Insight:  {}", expense.insight);
    println!("Source:   {}", describe_source(&source));
    Ok(())
}

fn build_categorizer(cfg: &Config, store: &Store) -> Result<Categorizer> {
    let mut categorizer =
        Categorizer::new(CategorizerConfig::default()).with_corrections(store.load_corrections()?);
    if let Some(client) = LlmClient::from_config(&cfg.llm) {
        debug!(model = client.model(), "remote classifier enabled");
        categorizer = categorizer.with_remote(Box::new(client));
    }
    Ok(categorizer)
}

fn describe_source(source: &Source) -> String {
    match source {
        Source::Correction { key } => format!("saved correction ({})", first_line(key)),
        Source::Remote => "language model".to_string(),
        Source::Keyword { fallback: None } => "keyword rules".to_string(),
        Source::Keyword { fallback: Some(_) } => {
            "keyword rules (language model unavailable)".to_string()
        }
    }
}

fn resolve_roommates(cfg: &Config, arg: Option<String>) -> Vec<String> {
    match arg {
        Some(s) => parse_roommates(&s),
        None => cfg.dashboard.roommates.clone(),
    }
}

/// Split "Alex, Maya,," into ["Alex", "Maya"]
fn parse_roommates(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

fn first_line(text: &str) -> &str {
    text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
}

fn export_csv(expenses: &[Expense], path: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    wtr.write_record(["date", "category", "amount", "insight", "raw_text"])?;
    for e in expenses {
        wtr.write_record([
            e.date.to_string(),
            e.category.to_string(),
            format!("{:.2}", e.amount),
            e.insight.clone(),
            e.raw_text.clone(),
        ])?;
    }
    wtr.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Scenario chat. Errors are shown to the user as-is rather than failing the command.
fn ask(cfg: &Config, store: &Store, question: &str) {
    let Some(client) = LlmClient::from_config(&cfg.llm) else {
        println!(
            "No language model configured. Set {} (or [llm] in ~/.mini-cfo/config.toml).",
            cfg.llm.api_key_env()
        );
        return;
    };

    let answer = store
        .load_expenses()
        .map(|expenses| spending_context(&expenses, cfg.dashboard.balance))
        .and_then(|context| {
            client.chat_complete(
                cfo_finance::categorizer::SYSTEM_PROMPT,
                &[ChatTurn::user(format!("{context}\nQuestion: {question}"))],
            )
        });

    match answer {
        Ok(text) => println!("{text}"),
        Err(e) => println!("Error: {e:#}"),
    }
}

fn spending_context(expenses: &[Expense], balance: f64) -> String {
    let mut s = String::new();
    s.push_str("My spending so far:\n");
    s.push_str(&format!("- total: ${:.2} over {} receipts\n", total_spent(expenses), expenses.len()));
    s.push_str(&format!("- balance: ${balance:.2}\n"));
    s.push_str(&format!(
        "- cash runway: {}\n",
        format_runway(cash_runway(expenses, balance))
    ));
    for t in cash_flow_by_category(expenses).unwrap_or_default() {
        s.push_str(&format!("- {}: ${:.2} ({} receipts)\n", t.category, t.amount, t.count));
    }
    s
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "cfo={level},cfo_core={level},cfo_finance={level},cfo_ingest={level}"
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
