use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "Income"),
            TransactionType::Expense => write!(f, "Expense"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("income") {
            Ok(TransactionType::Income)
        } else if s.eq_ignore_ascii_case("expense") {
            Ok(TransactionType::Expense)
        } else {
            Err(format!("unknown transaction type '{}' (expected Income or Expense)", s))
        }
    }
}

/// A transaction as held by the remote store. The `id` is always assigned
/// by the store; the store may send it as `id`, `_id`, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredRecord")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Wire shape of a stored transaction before the ID is settled
#[derive(Deserialize)]
struct StoredRecord {
    id: Option<String>,
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    #[serde(rename = "type")]
    kind: TransactionType,
    title: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    date: DateTime<Utc>,
    category: String,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<StoredRecord> for Transaction {
    type Error = String;

    fn try_from(record: StoredRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .or(record.mongo_id)
            .ok_or_else(|| "transaction has no id".to_string())?;
        Ok(Transaction {
            id,
            kind: record.kind,
            title: record.title,
            amount: record.amount,
            date: record.date,
            category: record.category,
            description: record.description,
        })
    }
}

/// The editable fields of a transaction. This is the create body and the
/// update body; it has no place for an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Transaction {
    /// Strip the record down to the six editable fields
    pub fn draft(&self) -> TransactionDraft {
        TransactionDraft {
            kind: self.kind,
            title: self.title.clone(),
            amount: self.amount,
            date: self.date,
            category: self.category.clone(),
            description: self.description.clone(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Amount with the sign implied by the type (expenses negative)
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn formatted_date(&self) -> String {
        self.date.format("%b %d, %Y").to_string()
    }
}

/// Dashboard totals over a set of transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl Totals {
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        transactions
            .into_iter()
            .fold(Totals::default(), |mut totals, t| {
                match t.kind {
                    TransactionType::Income => totals.income += t.amount,
                    TransactionType::Expense => totals.expense += t.amount,
                }
                totals
            })
    }

    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }
}
