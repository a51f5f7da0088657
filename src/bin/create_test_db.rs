use std::{
    error::Error,
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use ledger_rs::{
    UserId, initialize_db,
    transaction::{SQLiteTransactionStore, Transaction, TransactionStore},
};

/// A utility for creating a test database for the REST API server of ledger_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Deposits for each test user, oldest first.
const TEST_DEPOSITS: [(&str, &[f64]); 3] = [
    ("alice", &[100.0, 25.5, 12.25, 40.0, 5.0, 60.0, 7.75, 19.99, 3.0, 88.0, 14.0, 1.5]),
    ("bob", &[10.0, 20.0, 30.0]),
    ("carol", &[999.99]),
];

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
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)));
    let now = OffsetDateTime::now_utc();

    for (user, amounts) in TEST_DEPOSITS {
        println!("Creating {} transactions for {user}...", amounts.len());

        let user_id = UserId::new(user);
        let days_ago = amounts.len() as i64;

        for (i, &amount) in amounts.iter().enumerate() {
            let created_at = now - Duration::days(days_ago - i as i64);
            store.create(Transaction::build(user_id.clone(), amount).created_at(created_at))?;
        }
    }

    println!("Success!");

    Ok(())
}
