//! API client for communicating with the spendyze REST API.
//!
//! This module provides the `ApiClient` struct for the auth, transaction
//! and AI endpoints. Every authenticated call takes the bearer token
//! explicitly; the client itself holds no session state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::debug;

use crate::models::{
    AuthResponse, BudgetRecommendation, ChatMessage, ChatResponse, ScanResponse, ScannedBill,
    SummaryResponse, Transaction, TransactionDraft,
};

use super::{ApiError, ApiResult, TransactionStore};

// ============================================================================
// Constants
// ============================================================================

/// Default API host, used when neither config nor environment names one
pub const DEFAULT_API_BASE_URL: &str = "https://spendyze-fin-track.onrender.com";

const AUTH_PATH: &str = "/api/auth";
const TRANSACTIONS_PATH: &str = "/api/transactions";
const AI_PATH: &str = "/api/ai";

/// HTTP request timeout in seconds.
/// AI endpoints can take a while to generate; 60s covers a slow model.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// API client for the spendyze backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against `base_url` (scheme and host, no path)
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transactions_url(&self) -> String {
        self.url(TRANSACTIONS_PATH)
    }

    fn transaction_url(&self, id: &str) -> String {
        format!("{}/{}", self.transactions_url(), id)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> ApiResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    /// Send a request and decode the JSON body of a successful response
    async fn send_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> ApiResult<T> {
        let response = request.send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, url).await
    }

    /// Send a request whose successful response body is ignored
    async fn send_empty(request: RequestBuilder) -> ApiResult<()> {
        let response = request.send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, token: &str) -> ApiResult<T> {
        debug!(url = url, "GET");
        Self::send_json(self.client.get(url).bearer_auth(token), url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        token: Option<&str>,
        body: &B,
    ) -> ApiResult<T> {
        debug!(url = url, "POST");
        let mut request = self.client.post(url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::send_json(request, url).await
    }

    // ===== Auth =====

    /// Log in with email and password, returning the token and profile
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let url = self.url(&format!("{}/login", AUTH_PATH));
        self.post(&url, None, &json!({ "email": email, "password": password }))
            .await
    }

    /// Create an account, returning the token and profile of the new user
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let url = self.url(&format!("{}/register", AUTH_PATH));
        self.post(
            &url,
            None,
            &json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    // ===== AI =====

    pub async fn fetch_summary(&self, token: &str) -> ApiResult<String> {
        let url = self.url(&format!("{}/summary", AI_PATH));
        let response: SummaryResponse = self.get(&url, token).await?;
        Ok(response.summary)
    }

    /// Send a base64 encoded bill image for field extraction
    pub async fn scan_bill(&self, token: &str, image_base64: &str) -> ApiResult<ScannedBill> {
        let url = self.url(&format!("{}/scan", AI_PATH));
        let response: ScanResponse = self
            .post(&url, Some(token), &json!({ "image": image_base64 }))
            .await?;
        Ok(response.scanned_data)
    }

    pub async fn chat(&self, token: &str, history: &[ChatMessage]) -> ApiResult<String> {
        let url = self.url(&format!("{}/chat", AI_PATH));
        let response: ChatResponse = self
            .post(&url, Some(token), &json!({ "history": history }))
            .await?;
        Ok(response.text)
    }

    pub async fn fetch_budget_recommendation(&self, token: &str) -> ApiResult<BudgetRecommendation> {
        let url = self.url(&format!("{}/recommend-budget", AI_PATH));
        self.get(&url, token).await
    }
}

#[async_trait]
impl TransactionStore for ApiClient {
    async fn list_transactions(&self, token: &str) -> ApiResult<Vec<Transaction>> {
        let url = self.transactions_url();
        let transactions: Vec<Transaction> = self.get(&url, token).await?;
        debug!(count = transactions.len(), "Fetched transactions");
        Ok(transactions)
    }

    async fn create_transaction(
        &self,
        token: &str,
        draft: &TransactionDraft,
    ) -> ApiResult<Transaction> {
        let url = self.transactions_url();
        self.post(&url, Some(token), draft).await
    }

    async fn update_transaction(
        &self,
        token: &str,
        id: &str,
        draft: &TransactionDraft,
    ) -> ApiResult<Transaction> {
        let url = self.transaction_url(id);
        debug!(url = %url, "PUT");
        Self::send_json(self.client.put(&url).bearer_auth(token).json(draft), &url).await
    }

    async fn delete_transaction(&self, token: &str, id: &str) -> ApiResult<()> {
        let url = self.transaction_url(id);
        debug!(url = %url, "DELETE");
        Self::send_empty(self.client.delete(&url).bearer_auth(token)).await
    }

    async fn check_alerts(&self, token: &str) -> ApiResult<()> {
        let url = format!("{}/check-alerts", self.transactions_url());
        debug!(url = %url, "POST");
        Self::send_empty(self.client.post(&url).bearer_auth(token)).await
    }
}
