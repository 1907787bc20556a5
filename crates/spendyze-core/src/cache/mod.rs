//! In-memory transaction cache.
//!
//! This module provides the `TransactionCache`, a session-scoped mirror of
//! the signed-in user's transactions. The remote store stays the source of
//! truth: every change goes through the store first and only the store's
//! response is folded into the local records.

pub mod transactions;

pub use transactions::{CacheError, CacheSnapshot, TransactionCache};
