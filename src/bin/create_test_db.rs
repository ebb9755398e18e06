use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use pocketbook::{
    EntryType, ExpenseStore, NewExpense, SQLiteExpenseStore, SQLiteUserStore, UserStore,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of pocketbook.
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

    let conn = Arc::new(Mutex::new(conn));
    let user_store = SQLiteUserStore::new(conn.clone());
    let expense_store = SQLiteExpenseStore::new(conn);

    println!("Creating test user...");
    let user = user_store.create("test".parse()?)?;

    println!("Creating sample entries...");
    let today = OffsetDateTime::now_utc().date();
    let samples = [
        (EntryType::Income, "Salary", Decimal::new(3_000_000, 2), 30, None),
        (EntryType::Expense, "Rent", Decimal::new(850_000, 2), 29, None),
        (EntryType::Expense, "Food", Decimal::new(12_050, 2), 2, Some("Noodle shop")),
        (EntryType::Expense, "Transport", Decimal::new(4_500, 2), 1, Some("BTS")),
        (EntryType::Income, "Gift", Decimal::new(50_000, 2), 0, None),
    ];

    for (entry_type, category, amount, days_ago, place) in samples {
        expense_store.save(NewExpense {
            owner_id: user.id,
            entry_type,
            category: category.to_owned(),
            amount,
            note: None,
            place: place.map(str::to_owned),
            date: today - Duration::days(days_ago),
            payment_method: Some("cash".to_owned()),
            icon_key: None,
        })?;
    }

    println!("Success!");

    Ok(())
}
