//! AI advisor logic behind the `/api/ai` routes.
//!
//! The advisor picks a window of the user's most recent transactions,
//! hands it to a generative AI provider and maps the outcome to the
//! status and message the routes answer with. Storage and the provider
//! are traits so a server can plug in its own.
//!
//! Windows: summary 30, chat 50, budget 200 transactions.

pub mod error;
pub mod service;

pub use error::AdvisorError;
pub use service::{
    AiProvider, Advisor, TransactionHistory, BUDGET_GENERATION_FAILED, BUDGET_WINDOW,
    CHAT_WINDOW, SUMMARY_WINDOW,
};
