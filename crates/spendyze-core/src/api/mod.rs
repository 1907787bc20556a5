//! REST API client module for the spendyze backend.
//!
//! This module provides the `ApiClient` for the auth, transaction and AI
//! endpoints, and the `TransactionStore` trait the transaction cache is
//! written against.
//!
//! The API uses bearer token authentication; the token comes from the
//! `/api/auth/login` or `/api/auth/register` response.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::models::{Transaction, TransactionDraft};

pub use client::{ApiClient, DEFAULT_API_BASE_URL};
pub use error::ApiError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The remote transaction store as seen by the cache. The store assigns
/// IDs and owns the authoritative copy of every record.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// All transactions of the token's user, in the store's order
    async fn list_transactions(&self, token: &str) -> ApiResult<Vec<Transaction>>;

    /// Create a record; the response carries the store-assigned ID
    async fn create_transaction(&self, token: &str, draft: &TransactionDraft)
        -> ApiResult<Transaction>;

    async fn update_transaction(
        &self,
        token: &str,
        id: &str,
        draft: &TransactionDraft,
    ) -> ApiResult<Transaction>;

    async fn delete_transaction(&self, token: &str, id: &str) -> ApiResult<()>;

    /// Ask the store to evaluate budget alerts for the token's user
    async fn check_alerts(&self, token: &str) -> ApiResult<()>;
}
