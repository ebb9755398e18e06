use std::error::Error;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;

use pocketbook::{
    AdminExpenseStore, DateRange, SQLiteExpenseStore, initialize_db, parse_optional_date,
};

/// Print every user's entries in a pocketbook database as JSON.
///
/// This reads across all users and is meant for administrators only.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// Only include entries dated on or after this date.
    #[arg(long)]
    start: Option<String>,

    /// Only include entries dated on or before this date.
    #[arg(long)]
    end: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let start = parse_optional_date(args.start.as_deref())?;
    let end = parse_optional_date(args.end.as_deref())?;
    let range = DateRange::from_bounds(start, end)?;

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;
    let store = SQLiteExpenseStore::new(Arc::new(Mutex::new(conn)));

    let expenses = match range {
        Some(range) => store.list_in_range(range)?,
        None => store.list_all()?,
    };

    println!("{}", serde_json::to_string_pretty(&expenses)?);

    Ok(())
}
