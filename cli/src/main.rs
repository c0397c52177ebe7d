// chatbox — terminal message log
//
// Register users, send short messages between them, and browse, filter,
// search or resort the messages from an interactive menu.

mod config;
mod ui;

use anyhow::{Context, Result};
use chatbox_core::{read_log, Chatbox, CsvLogAppender, RecordStore};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chatbox")]
#[command(about = "Chatbox — terminal message log", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu (default)
    Run {
        /// Message log to append to (overrides config)
        #[arg(short, long)]
        log_file: Option<PathBuf>,
    },
    /// Show entries from the message log
    Log {
        #[arg(short, long)]
        log_file: Option<PathBuf>,
        /// Only show messages from this sender
        #[arg(short, long)]
        sender: Option<String>,
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        None => cmd_run(None),
        Some(Commands::Run { log_file }) => cmd_run(log_file),
        Some(Commands::Log {
            log_file,
            sender,
            limit,
            json,
        }) => cmd_log(log_file, sender, limit, json),
        Some(Commands::Config { action }) => cmd_config(action),
    }
}

/// Diagnostics go to `<data dir>/chatbox.log` so they stay out of the menu.
/// Falls back to stderr when the data directory is unavailable.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    match config::Config::data_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::never(dir, "chatbox.log");
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(appender)
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn cmd_run(log_file: Option<PathBuf>) -> Result<()> {
    let config = config::Config::load()?;
    let log_path = log_file.unwrap_or_else(|| PathBuf::from(&config.log_path));

    tracing::info!("Starting menu, logging messages to {}", log_path.display());

    let mut chatbox = Chatbox::new(
        RecordStore::with_limits(config.limits),
        CsvLogAppender::new(&log_path, config.log_format),
        config.text_policy,
    );

    println!("{}", "Chatbox".bold());
    println!("Messages are logged to {}", log_path.display().to_string().bright_cyan());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    ui::run_menu(&mut chatbox, stdin.lock(), stdout.lock())
}

fn cmd_log(
    log_file: Option<PathBuf>,
    sender: Option<String>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let config = config::Config::load()?;
    let log_path = log_file.unwrap_or_else(|| PathBuf::from(&config.log_path));

    let mut entries = read_log(&log_path, config.log_format)
        .with_context(|| format!("Failed to read message log {}", log_path.display()))?;

    if let Some(sender) = &sender {
        entries.retain(|m| &m.sender_name == sender);
    }
    // Most recent last, like the file itself
    let skip = entries.len().saturating_sub(limit);
    let entries = &entries[skip..];

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(entries).context("Failed to serialize log entries")?
        );
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No messages found.".dimmed());
        return Ok(());
    }

    println!("{} ({} messages)", "Message Log".bold(), entries.len());
    println!();

    let mut stdout = std::io::stdout().lock();
    for message in entries {
        ui::render_message(message, &mut stdout)?;
    }

    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    let mut config = config::Config::load()?;

    match action {
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} Set {} = {}", "✓".green(), key.bright_cyan(), value);
        }

        ConfigAction::Get { key } => {
            if let Some(value) = config.get(&key) {
                println!("{} = {}", key.bright_cyan(), value);
            } else {
                anyhow::bail!("Unknown config key: {}", key);
            }
        }

        ConfigAction::List => {
            println!("{}", "Configuration".bold());
            println!();

            for (key, value) in config.list() {
                println!("  {:<20} {}", key.bright_cyan(), value);
            }

            println!();
            println!(
                "Config file: {}",
                config::Config::config_file()?.display().to_string().dimmed()
            );
        }
    }

    Ok(())
}
