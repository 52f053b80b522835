//! table-transfer CLI - copy one SQL Server table into another.

mod progress;
mod prompt;

use std::io::{self, IsTerminal};

use clap::Parser;
use table_transfer::{
    TableTransfer, TransferConfig, TransferError, TransferStatus, DEFAULT_BATCH_SIZE,
};
use tracing::{debug, Level};

use crate::progress::ConsoleProgress;
use crate::prompt::{Ask, LinePrompter, Preset, TerminalPrompter, NOT_EMPTY_WARNING};

#[derive(Parser)]
#[command(name = "table-transfer")]
#[command(about = "Copy a table between SQL Server databases")]
#[command(version)]
struct Cli {
    /// Source connection string (skips the prompt)
    #[arg(long, env = "TABLE_TRANSFER_SOURCE")]
    source: Option<String>,

    /// Destination connection string (skips the prompt)
    #[arg(long, env = "TABLE_TRANSFER_DESTINATION")]
    destination: Option<String>,

    /// Table to transfer (skips the prompt)
    #[arg(long, env = "TABLE_TRANSFER_TABLE")]
    table: Option<String>,

    /// Destination table name (skips the prompt)
    #[arg(long, env = "TABLE_TRANSFER_DEST_TABLE")]
    dest_table: Option<String>,

    /// Rows per page
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.verbosity, &cli.log_format);

    if let Err(e) = run(cli).await {
        println!("Error: {}", e);
        debug!("{}", e.format_detailed());
    }
}

async fn run(cli: Cli) -> Result<(), TransferError> {
    let preset = Preset {
        source: cli.source,
        destination: cli.destination,
        table: cli.table,
        dest_table: cli.dest_table,
    };

    let mut prompter: Box<dyn Ask> = if io::stdin().is_terminal() {
        Box::new(TerminalPrompter::stdout())
    } else {
        Box::new(LinePrompter::new(io::stdin().lock(), io::stdout()))
    };

    let request = prompt::collect_request(prompter.as_mut(), preset)?;
    let config = TransferConfig::default().with_batch_size(cli.batch_size);
    let transfer = TableTransfer::mssql(&request, config)?;

    let mut gate = |_table: &str, _rows: i64| -> table_transfer::Result<bool> {
        let answer = prompter.ask(NOT_EMPTY_WARNING)?;
        Ok(prompt::confirms(&answer))
    };
    let mut sink = ConsoleProgress::stdout();

    let result = transfer.run(&request, &mut gate, &mut sink).await;
    sink.finish()?;
    let summary = result?;

    match summary.status {
        TransferStatus::Completed => println!("Table transferred successfully."),
        TransferStatus::Cancelled => println!("Operation cancelled by user."),
    }

    if cli.output_json {
        println!("{}", summary.to_json()?);
    }

    Ok(())
}

/// Logs go to stderr; stdout carries prompts, progress and the status line.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
