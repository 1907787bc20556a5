//! Core library for spendyze.
//!
//! Holds everything the front ends share: the REST API client, the
//! authenticated session, the in-memory transaction cache, the data
//! models, and the AI advisor logic that sits behind the `/api/ai` routes.

pub mod advisor;
pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod notify;
pub mod utils;

pub use api::{ApiClient, ApiError, TransactionStore};
pub use auth::{Credential, Session};
pub use cache::{CacheError, CacheSnapshot, TransactionCache};
pub use config::Config;
pub use models::{Transaction, TransactionDraft, TransactionType, User};
pub use notify::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
