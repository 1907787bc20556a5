//! Data models for spendyze entities.
//!
//! - `Transaction`, `TransactionDraft`: income/expense records and the
//!   editable subset the client sends to the store
//! - `User`: the profile returned alongside a session token
//! - AI payloads: `SummaryResponse`, `ScannedBill`, `ChatMessage`,
//!   `BudgetRecommendation`

pub mod ai;
pub mod transaction;
pub mod user;

pub use ai::{
    BudgetLine, BudgetRecommendation, ChatMessage, ChatResponse, ChatSender, ScanResponse,
    ScannedBill, SummaryResponse,
};
pub use transaction::{Totals, Transaction, TransactionDraft, TransactionType};
pub use user::{AuthResponse, User};
