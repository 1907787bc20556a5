//! These structs provide the CLI interface for the spendyze client.

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use rust_decimal::Decimal;
use spendyze_core::TransactionType;

/// spendyze: track income and expenses against your spendyze account.
///
/// Sign in once with `spendyze login`; the session is kept until you run
/// `spendyze logout`. Set SPENDYZE_API_URL (or `api_url` in the config
/// file) to talk to a self-hosted backend.
#[derive(Debug, Parser)]
#[command(name = "spendyze", version)]
pub struct Args {
    /// API host, e.g. http://localhost:5000
    #[arg(long, global = true, env = "SPENDYZE_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Forget the stored session.
    Logout,
    /// Income, expenses and balance, with the latest transactions.
    Dashboard,
    /// List all transactions, newest additions first.
    List {
        /// Only show this type
        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },
    /// Record a new transaction.
    Add(AddArgs),
    /// Change fields of an existing transaction.
    Edit(EditArgs),
    /// Delete a transaction.
    Delete { id: String },
    /// Ask the AI for a summary of recent spending.
    Summary,
    /// Extract a transaction from a photo of a bill.
    Scan {
        /// Image file (PNG or JPEG)
        path: std::path::PathBuf,
        /// Add the scanned bill as a transaction
        #[arg(long)]
        add: bool,
    },
    /// Chat with the finance assistant about your transactions.
    Chat,
    /// Ask the AI for a monthly budget based on your history.
    Budget,
}

#[derive(ClapArgs, Debug)]
pub struct AddArgs {
    #[arg(long = "type")]
    pub kind: TransactionType,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long)]
    pub category: String,
    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct EditArgs {
    pub id: String,
    #[arg(long = "type")]
    pub kind: Option<TransactionType>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub amount: Option<Decimal>,
    #[arg(long)]
    pub category: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "spendyze", "add", "--type", "income", "--title", "Salary", "--amount", "5000",
            "--category", "Salary", "--date", "2024-03-01",
        ])
        .unwrap();
        match args.command {
            Command::Add(add) => {
                assert_eq!(add.kind, TransactionType::Income);
                assert_eq!(add.amount, Decimal::from(5000));
                assert_eq!(add.date, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert!(add.description.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_edit_partial() {
        let args =
            Args::try_parse_from(["spendyze", "edit", "65f1c0", "--amount", "12.50"]).unwrap();
        match args.command {
            Command::Edit(edit) => {
                assert_eq!(edit.id, "65f1c0");
                assert_eq!(edit.amount, Some(Decimal::new(1250, 2)));
                assert!(edit.title.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(Args::try_parse_from(["spendyze", "list", "--type", "transfer"]).is_err());
    }
}
