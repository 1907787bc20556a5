use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error};

use crate::models::{
    BudgetRecommendation, ChatMessage, ChatResponse, ScanResponse, ScannedBill, SummaryResponse,
    Transaction,
};

use super::AdvisorError;

// ============================================================================
// Constants
// ============================================================================

/// Transactions considered for a summary
pub const SUMMARY_WINDOW: usize = 30;

/// Transactions given to the chatbot as context
pub const CHAT_WINDOW: usize = 50;

/// Transactions considered for a budget recommendation
pub const BUDGET_WINDOW: usize = 200;

/// Minimum records in the budget window
const MIN_BUDGET_INCOMES: usize = 1;
const MIN_BUDGET_EXPENSES: usize = 5;

/// Providers put this in the error when the model's budget output was
/// unusable. The advisor looks for it in the error text.
pub const BUDGET_GENERATION_FAILED: &str = "Failed to generate budget with AI";

const NO_SUMMARY_DATA: &str = "Not enough data for a summary. Add some transactions first!";
const SUMMARY_FAILED: &str = "Failed to generate AI summary.";
const NO_IMAGE: &str = "No image data provided.";
const SCAN_FAILED: &str = "Failed to analyze the bill with AI.";
const NO_CHAT_HISTORY: &str = "No chat history provided.";
const CHAT_FAILED: &str = "Failed to get a response from the chatbot.";
const NOT_ENOUGH_BUDGET_DATA: &str = "Not enough transaction data. Please add at least one income and a few expense records to generate a budget.";
const BUDGET_AI_TROUBLE: &str = "Our AI had trouble analyzing your spending patterns. Please try again after adding more varied transactions.";
const BUDGET_FAILED: &str = "A server error occurred while generating your budget.";

/// Read access to a user's stored transactions
#[async_trait]
pub trait TransactionHistory: Send + Sync {
    /// Up to `limit` transactions of `user_id`, newest date first
    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Transaction>>;
}

/// The generative AI service
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn summarize(&self, transactions: &[Transaction]) -> Result<String>;

    async fn analyze_bill(&self, image_base64: &str) -> Result<ScannedBill>;

    async fn chat(&self, history: &[ChatMessage], transactions: &[Transaction]) -> Result<String>;

    async fn recommend_budget(&self, transactions: &[Transaction]) -> Result<BudgetRecommendation>;
}

pub struct Advisor<H, P> {
    history: H,
    provider: P,
}

impl<H: TransactionHistory, P: AiProvider> Advisor<H, P> {
    pub fn new(history: H, provider: P) -> Self {
        Self { history, provider }
    }

    /// Summary of the user's last `SUMMARY_WINDOW` transactions
    pub async fn summary(&self, user_id: &str) -> Result<SummaryResponse, AdvisorError> {
        match self.generate_summary(user_id).await {
            Ok(summary) => Ok(SummaryResponse { summary }),
            Err(e) => {
                error!(user_id = user_id, error = %format!("{:#}", e), "AI summary failed");
                Err(AdvisorError::Internal(SUMMARY_FAILED.to_string()))
            }
        }
    }

    /// Extract transaction fields from a base64 encoded bill image
    pub async fn scan_bill(&self, image_base64: &str) -> Result<ScanResponse, AdvisorError> {
        if image_base64.trim().is_empty() {
            return Err(AdvisorError::BadRequest(NO_IMAGE.to_string()));
        }

        match self.provider.analyze_bill(image_base64).await {
            Ok(scanned_data) => Ok(ScanResponse { scanned_data }),
            Err(e) => {
                error!(error = %format!("{:#}", e), "AI bill scan failed");
                Err(AdvisorError::Internal(SCAN_FAILED.to_string()))
            }
        }
    }

    /// Answer the latest chat turn with the last `CHAT_WINDOW` transactions
    /// as context
    pub async fn chat(
        &self,
        user_id: &str,
        history: &[ChatMessage],
    ) -> Result<ChatResponse, AdvisorError> {
        if history.is_empty() {
            return Err(AdvisorError::BadRequest(NO_CHAT_HISTORY.to_string()));
        }

        match self.chat_reply(user_id, history).await {
            Ok(text) => Ok(ChatResponse { text }),
            Err(e) => {
                error!(user_id = user_id, error = %format!("{:#}", e), "AI chat failed");
                Err(AdvisorError::Internal(CHAT_FAILED.to_string()))
            }
        }
    }

    /// Recommend a budget from the last `BUDGET_WINDOW` transactions.
    /// Needs at least one income and five expenses in the window.
    pub async fn recommend_budget(
        &self,
        user_id: &str,
    ) -> Result<BudgetRecommendation, AdvisorError> {
        let transactions = match self.history.recent(user_id, BUDGET_WINDOW).await {
            Ok(transactions) => transactions,
            Err(e) => return Err(Self::budget_failure(user_id, e)),
        };

        if !has_budget_data(&transactions) {
            debug!(user_id = user_id, count = transactions.len(), "Not enough data for a budget");
            return Err(AdvisorError::BadRequest(NOT_ENOUGH_BUDGET_DATA.to_string()));
        }

        self.provider
            .recommend_budget(&transactions)
            .await
            .map_err(|e| Self::budget_failure(user_id, e))
    }

    async fn generate_summary(&self, user_id: &str) -> Result<String> {
        let transactions = self.history.recent(user_id, SUMMARY_WINDOW).await?;
        if transactions.is_empty() {
            return Ok(NO_SUMMARY_DATA.to_string());
        }
        self.provider.summarize(&transactions).await
    }

    async fn chat_reply(&self, user_id: &str, history: &[ChatMessage]) -> Result<String> {
        let transactions = self.history.recent(user_id, CHAT_WINDOW).await?;
        self.provider.chat(history, &transactions).await
    }

    fn budget_failure(user_id: &str, e: anyhow::Error) -> AdvisorError {
        let detail = format!("{:#}", e);
        error!(user_id = user_id, error = %detail, "AI budget recommendation failed");
        if detail.contains(BUDGET_GENERATION_FAILED) {
            AdvisorError::Internal(BUDGET_AI_TROUBLE.to_string())
        } else {
            AdvisorError::Internal(BUDGET_FAILED.to_string())
        }
    }
}

fn has_budget_data(transactions: &[Transaction]) -> bool {
    let incomes = transactions.iter().filter(|t| t.is_income()).count();
    let expenses = transactions.iter().filter(|t| t.is_expense()).count();
    incomes >= MIN_BUDGET_INCOMES && expenses >= MIN_BUDGET_EXPENSES
}
