use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budgeteur_recurring::{
    Frequency, NewRecurringTemplate, RecurringTemplateStore, TransactionType, initialize_db,
    stores::sqlite::SQLiteTemplateStore,
};

/// A utility for creating a test database with recurring transaction templates.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let mut store = SQLiteTemplateStore::new(Arc::new(Mutex::new(conn)));
    let today = OffsetDateTime::now_utc().date();

    println!("Creating recurring templates...");

    let mut rent = NewRecurringTemplate::build(
        "Rent",
        1450.0,
        TransactionType::Expense,
        Frequency::Monthly,
        today,
    );
    rent.category = "Housing".to_owned();
    rent.merchant = Some("Landlord".to_owned());
    store.create(rent)?;

    let mut salary = NewRecurringTemplate::build(
        "Salary",
        3200.0,
        TransactionType::Income,
        Frequency::Custom,
        today - Duration::days(3),
    );
    salary.category = "Income".to_owned();
    salary.custom_interval_days = Some(14);
    store.create(salary)?;

    let mut streaming = NewRecurringTemplate::build(
        "Streaming subscription",
        15.99,
        TransactionType::Expense,
        Frequency::Weekly,
        today - Duration::days(1),
    );
    streaming.category = "Entertainment".to_owned();
    streaming.subcategory = Some("Subscriptions".to_owned());
    store.create(streaming)?;

    let mut gym = NewRecurringTemplate::build(
        "Gym membership",
        60.0,
        TransactionType::Expense,
        Frequency::Monthly,
        today - Duration::days(10),
    );
    gym.category = "Health".to_owned();
    gym.end_date = Some(today - Duration::days(1));
    store.create(gym)?;

    let mut insurance = NewRecurringTemplate::build(
        "Car insurance",
        780.0,
        TransactionType::Expense,
        Frequency::Yearly,
        today + Duration::days(30),
    );
    insurance.category = "Transport".to_owned();
    store.create(insurance)?;

    let mut manual = NewRecurringTemplate::build(
        "Savings transfer",
        200.0,
        TransactionType::Expense,
        Frequency::Daily,
        today,
    );
    manual.category = "Savings".to_owned();
    manual.auto_create = false;
    store.create(manual)?;

    println!("Success!");

    Ok(())
}
