use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use time::{Date, Duration, OffsetDateTime};

use rupiah_ledger::{
    Kind, NewTransaction, count_transactions, create_transaction, initialize_db, open_database,
};

/// A utility for creating a test database for the REST API server of rupiah_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many transactions to create.
    #[arg(long, default_value_t = 50)]
    count: u32,
}

const EXPENSES: [(&str, i64); 5] = [
    ("Groceries", 350_000),
    ("Electricity", 420_000),
    ("Coffee", 35_000),
    ("Fuel", 150_000),
    ("Internet", 300_000),
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
    let conn = open_database(output_path)?;

    initialize_db(&conn)?;

    println!("Creating {} test transactions...", args.count);

    let today = OffsetDateTime::now_utc().date();

    for i in 0..args.count {
        let Some(new_transaction) = sample_transaction(today, i) else {
            eprintln!("Ran out of dates after {i} transactions, stopping early.");
            break;
        };

        create_transaction(new_transaction, &conn)?;
    }

    println!("Created {} transactions.", count_transactions(&conn)?);
    println!("Success!");

    Ok(())
}

/// The `i`th sample transaction, dated `i` days before `today`.
///
/// Returns `None` once the date would fall before the earliest supported date.
fn sample_transaction(today: Date, i: u32) -> Option<NewTransaction> {
    let date = today.checked_sub(Duration::days(i64::from(i)))?;

    // A salary on every 30th day, expenses in between.
    let new_transaction = if i % 30 == 0 {
        NewTransaction::new(Kind::Income, "Salary", 8_500_000, date)
    } else {
        let (description, amount) = EXPENSES[i as usize % EXPENSES.len()];
        NewTransaction::new(Kind::Expense, description, amount, date)
    };

    Some(new_transaction)
}
