use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{TransactionDraft, TransactionType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Fields the AI pulled out of a bill image. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScannedBill {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionType>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ScannedBill {
    /// Build a draft from the scan. Needs at least a title and an amount;
    /// the rest falls back to an expense dated `today` in "Other".
    pub fn into_draft(self, today: DateTime<Utc>) -> Option<TransactionDraft> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let amount = self.amount?;
        Some(TransactionDraft {
            kind: self.kind.unwrap_or(TransactionType::Expense),
            title,
            amount,
            date: self.date.unwrap_or(today),
            category: self.category.unwrap_or_else(|| "Other".to_string()),
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    #[serde(rename = "scannedData")]
    pub scanned_data: ScannedBill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: ChatSender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: ChatSender::Bot,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    #[serde(default)]
    pub budget: Vec<BudgetLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

impl BudgetRecommendation {
    pub fn total(&self) -> Decimal {
        self.budget.iter().map(|line| line.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_scanned_bill_into_draft_defaults() {
        let today = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let bill: ScannedBill =
            serde_json::from_str(r#"{"title":"Power Co","amount":82.4}"#).unwrap();
        let draft = bill.into_draft(today).expect("title and amount present");
        assert_eq!(draft.kind, TransactionType::Expense);
        assert_eq!(draft.category, "Other");
        assert_eq!(draft.date, today);
        assert_eq!(draft.amount, Decimal::new(824, 1));
    }

    #[test]
    fn test_scanned_bill_without_amount_is_not_a_draft() {
        let today = Utc::now();
        let bill = ScannedBill {
            title: Some("Receipt".to_string()),
            ..Default::default()
        };
        assert!(bill.into_draft(today).is_none());
    }

    #[test]
    fn test_chat_message_wire_format() {
        let json = serde_json::to_string(&ChatMessage::user("How much on food?")).unwrap();
        assert_eq!(json, r#"{"sender":"user","text":"How much on food?"}"#);
    }

    #[test]
    fn test_budget_total() {
        let budget: BudgetRecommendation = serde_json::from_str(
            r#"{"budget":[{"category":"Food","amount":400},{"category":"Rent","amount":1200.5}],"advice":"Cut takeaway"}"#,
        )
        .unwrap();
        assert_eq!(budget.total(), Decimal::new(16005, 1));
        assert_eq!(budget.advice.as_deref(), Some("Cut takeaway"));
    }
}
