use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use budgeteur_recurring::{
    GenerationResponse, initialize_db, parse_date, run_generation_cycle,
    stores::sqlite::{SQLiteTemplateStore, SQLiteTransactionStore},
    today,
};

/// Run one recurring transaction generation cycle without going through the HTTP server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The canonical timezone used to decide what today is, e.g. "Pacific/Auckland".
    #[arg(long)]
    timezone: String,

    /// Run the cycle as if today were this date (yyyy-MM-dd).
    #[arg(long)]
    date: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let run_date = match &args.date {
        Some(date) => parse_date(date)?,
        None => today(&args.timezone)?,
    };

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let mut template_store = SQLiteTemplateStore::new(conn.clone());
    let mut transaction_store = SQLiteTransactionStore::new(conn);

    let report = run_generation_cycle(run_date, &mut template_store, &mut transaction_store)?;
    let response = GenerationResponse::from(&report);

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
