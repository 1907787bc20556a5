use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, TransactionStore};
use crate::auth::Credential;
use crate::models::{Totals, Transaction, TransactionDraft};
use crate::notify::{Notice, Notifier};
use crate::utils::age_display;

// ============================================================================
// Messages
// ============================================================================

const LOAD_FAILED: &str = "Failed to fetch transactions.";
const ADD_FAILED: &str = "Failed to add transaction.";
const UPDATE_FAILED: &str = "Failed to update transaction.";
const DELETE_FAILED: &str = "Failed to delete transaction.";
const ADD_REQUIRES_LOGIN: &str = "You must be logged in to add a transaction.";

const ADDED: &str = "Transaction added successfully!";
const UPDATED: &str = "Transaction updated successfully!";
const DELETED: &str = "Transaction deleted successfully!";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("You must be logged in.")]
    NotAuthenticated,

    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: ApiError,
    },
}

/// Read-only view of the cache handed to subscribers
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    pub records: Vec<Transaction>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub synced_at: Option<DateTime<Utc>>,
}

/// Which session the records were last loaded for
#[derive(Debug, Clone, PartialEq, Eq)]
enum ObservedSession {
    Unobserved,
    SignedOut,
    SignedIn(String),
}

impl ObservedSession {
    fn of(credential: Option<&Credential>) -> Self {
        match usable(credential) {
            Some(c) => ObservedSession::SignedIn(c.token.clone()),
            None => ObservedSession::SignedOut,
        }
    }
}

fn usable(credential: Option<&Credential>) -> Option<&Credential> {
    credential.filter(|c| c.is_valid())
}

pub struct TransactionCache<S: TransactionStore + 'static> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    records: Vec<Transaction>,
    loading: bool,
    last_error: Option<String>,
    synced_at: Option<DateTime<Utc>>,
    observed: ObservedSession,
    snapshot_tx: watch::Sender<CacheSnapshot>,
    background: JoinSet<()>,
}

impl<S: TransactionStore + 'static> TransactionCache<S> {
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        let (snapshot_tx, _) = watch::channel(CacheSnapshot::default());
        Self {
            store,
            notifier,
            records: Vec::new(),
            loading: false,
            last_error: None,
            synced_at: None,
            observed: ObservedSession::Unobserved,
            snapshot_tx,
            background: JoinSet::new(),
        }
    }

    // =========================================================================
    // Read model
    // =========================================================================

    /// Records in the order the store returned them, newest additions first
    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.records.iter().find(|t| t.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed load, kept until a load succeeds
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    pub fn synced_display(&self) -> String {
        self.synced_at
            .map(age_display)
            .unwrap_or_else(|| "never".to_string())
    }

    pub fn totals(&self) -> Totals {
        Totals::from_transactions(&self.records)
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            records: self.records.clone(),
            loading: self.loading,
            last_error: self.last_error.clone(),
            synced_at: self.synced_at,
        }
    }

    /// Receive a fresh snapshot after every change to the cache
    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.snapshot_tx.subscribe()
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    fn fail(&self, default: &str, e: ApiError) -> CacheError {
        let message = e.user_message(default);
        self.notifier.notify(Notice::error(message.clone()));
        CacheError::Failed { message, source: e }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace the records with the store's list for `credential`.
    ///
    /// Without a credential the records are emptied and no request is made.
    /// A failed load keeps the previous records and sets `last_error`.
    pub async fn load(&mut self, credential: Option<&Credential>) -> Result<(), CacheError> {
        let Some(credential) = usable(credential) else {
            debug!("No credential, clearing transactions");
            self.records.clear();
            self.loading = false;
            self.last_error = None;
            self.synced_at = None;
            self.publish();
            return Ok(());
        };

        self.loading = true;
        self.publish();

        let result = match self.store.list_transactions(&credential.token).await {
            Ok(records) => {
                info!(count = records.len(), "Loaded transactions");
                self.records = records;
                self.last_error = None;
                self.synced_at = Some(Utc::now());
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load transactions");
                let err = self.fail(LOAD_FAILED, e);
                self.last_error = Some(err.to_string());
                Err(err)
            }
        };

        self.loading = false;
        self.publish();
        result
    }

    /// Reload when the session changed since the last call: signed in,
    /// signed out, or signed in with a different token. Returns whether a
    /// load ran.
    pub async fn sync_credential(
        &mut self,
        credential: Option<&Credential>,
    ) -> Result<bool, CacheError> {
        let observed = ObservedSession::of(credential);
        if observed == self.observed {
            return Ok(false);
        }
        debug!(from = ?self.observed, to = ?observed, "Session changed, reloading");
        self.observed = observed;
        self.load(credential).await?;
        Ok(true)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a transaction in the store and put the stored record at the
    /// head of the list. Fails without a request when signed out.
    pub async fn add(
        &mut self,
        credential: Option<&Credential>,
        draft: TransactionDraft,
    ) -> Result<Transaction, CacheError> {
        let Some(credential) = usable(credential) else {
            self.notifier.notify(Notice::error(ADD_REQUIRES_LOGIN));
            return Err(CacheError::NotAuthenticated);
        };

        match self.store.create_transaction(&credential.token, &draft).await {
            Ok(created) => {
                info!(id = %created.id, "Transaction added");
                self.records.insert(0, created.clone());
                self.publish();
                self.notifier.notify(Notice::success(ADDED));
                self.spawn_alert_check(credential.token.clone());
                Ok(created)
            }
            Err(e) => {
                error!(error = %e, "Failed to add transaction");
                Err(self.fail(ADD_FAILED, e))
            }
        }
    }

    /// Budget alerts are best effort: the add has already succeeded, so a
    /// failure here is only logged.
    fn spawn_alert_check(&mut self, token: String) {
        while self.background.try_join_next().is_some() {}
        let store = Arc::clone(&self.store);
        self.background.spawn(async move {
            if let Err(e) = store.check_alerts(&token).await {
                warn!(error = %e, "Budget alert check failed");
            }
        });
    }

    /// Wait for detached side calls to finish. Dropping the cache aborts
    /// any that are still running, so a process should call this before
    /// it exits.
    pub async fn finish_background(&mut self) {
        while self.background.join_next().await.is_some() {}
    }

    /// Send the editable fields of `transaction` to the store and swap the
    /// stored copy into place. Returns `Ok(None)` when signed out.
    pub async fn update(
        &mut self,
        credential: Option<&Credential>,
        transaction: &Transaction,
    ) -> Result<Option<Transaction>, CacheError> {
        let Some(credential) = usable(credential) else {
            debug!(id = %transaction.id, "Not signed in, skipping update");
            return Ok(None);
        };

        let draft = transaction.draft();
        match self
            .store
            .update_transaction(&credential.token, &transaction.id, &draft)
            .await
        {
            Ok(updated) => {
                info!(id = %updated.id, "Transaction updated");
                if let Some(slot) = self.records.iter_mut().find(|t| t.id == updated.id) {
                    *slot = updated.clone();
                }
                self.publish();
                self.notifier.notify(Notice::success(UPDATED));
                Ok(Some(updated))
            }
            Err(e) => {
                error!(id = %transaction.id, error = %e, "Failed to update transaction");
                Err(self.fail(UPDATE_FAILED, e))
            }
        }
    }

    /// Delete a transaction in the store, then drop it locally. Returns
    /// `Ok(false)` when signed out.
    pub async fn delete(
        &mut self,
        credential: Option<&Credential>,
        id: &str,
    ) -> Result<bool, CacheError> {
        let Some(credential) = usable(credential) else {
            debug!(id = id, "Not signed in, skipping delete");
            return Ok(false);
        };

        match self.store.delete_transaction(&credential.token, id).await {
            Ok(()) => {
                info!(id = id, "Transaction deleted");
                if let Some(index) = self.records.iter().position(|t| t.id == id) {
                    self.records.remove(index);
                }
                self.publish();
                self.notifier.notify(Notice::success(DELETED));
                Ok(true)
            }
            Err(e) => {
                error!(id = id, error = %e, "Failed to delete transaction");
                Err(self.fail(DELETE_FAILED, e))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use rust_decimal::Decimal;
    use tokio::sync::Notify;

    use crate::api::ApiResult;
    use crate::models::{TransactionType, User};
    use crate::notify::{drain, ChannelNotifier, NoticeLevel};

    #[derive(Default)]
    struct FakeState {
        list: Vec<Transaction>,
        next_id: u32,
        failure: Option<(u16, String)>,
        alert_failure: bool,
        gated: bool,
        calls: Vec<String>,
    }

    #[derive(Default)]
    struct FakeStore {
        state: Mutex<FakeState>,
        // Holds a gated list call until released
        gate: Notify,
    }

    impl FakeStore {
        fn with_list(list: Vec<Transaction>) -> Self {
            let store = Self::default();
            store.state.lock().unwrap().list = list;
            store
        }

        fn fail_with(&self, status: u16, body: &str) {
            self.state.lock().unwrap().failure = Some((status, body.to_string()));
        }

        fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }

        fn record(&self, call: &str) -> ApiResult<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call.to_string());
            match state.failure.take() {
                Some((status, body)) => Err(ApiError::from_status(
                    StatusCode::from_u16(status).unwrap(),
                    &body,
                )),
                None => Ok(()),
            }
        }
    }

    fn stored(id: String, draft: &TransactionDraft) -> Transaction {
        Transaction {
            id,
            kind: draft.kind,
            title: draft.title.clone(),
            amount: draft.amount,
            date: draft.date,
            category: draft.category.clone(),
            description: draft.description.clone(),
        }
    }

    #[async_trait]
    impl TransactionStore for FakeStore {
        async fn list_transactions(&self, token: &str) -> ApiResult<Vec<Transaction>> {
            self.record(&format!("list {}", token))?;
            let gated = self.state.lock().unwrap().gated;
            if gated {
                self.gate.notified().await;
            }
            Ok(self.state.lock().unwrap().list.clone())
        }

        async fn create_transaction(
            &self,
            _token: &str,
            draft: &TransactionDraft,
        ) -> ApiResult<Transaction> {
            self.record("create")?;
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            Ok(stored(format!("srv-{}", state.next_id), draft))
        }

        async fn update_transaction(
            &self,
            _token: &str,
            id: &str,
            draft: &TransactionDraft,
        ) -> ApiResult<Transaction> {
            self.record(&format!("update {}", id))?;
            Ok(stored(id.to_string(), draft))
        }

        async fn delete_transaction(&self, _token: &str, id: &str) -> ApiResult<()> {
            self.record(&format!("delete {}", id))
        }

        async fn check_alerts(&self, _token: &str) -> ApiResult<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("check-alerts".to_string());
            if state.alert_failure {
                return Err(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, ""));
            }
            Ok(())
        }
    }

    fn credential(token: &str) -> Credential {
        Credential::new(
            token,
            User {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
        )
    }

    fn draft(kind: TransactionType, title: &str, amount: i64) -> TransactionDraft {
        TransactionDraft {
            kind,
            title: title.to_string(),
            amount: Decimal::from(amount),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            category: "General".to_string(),
            description: None,
        }
    }

    fn record(id: &str, kind: TransactionType, amount: i64) -> Transaction {
        stored(id.to_string(), &draft(kind, "Seed", amount))
    }

    fn cache_with(
        store: Arc<FakeStore>,
    ) -> (
        TransactionCache<FakeStore>,
        tokio::sync::mpsc::UnboundedReceiver<Notice>,
    ) {
        let (notifier, rx) = ChannelNotifier::new();
        (TransactionCache::new(store, Arc::new(notifier)), rx)
    }

    async fn loaded(
        list: Vec<Transaction>,
    ) -> (
        Arc<FakeStore>,
        TransactionCache<FakeStore>,
        tokio::sync::mpsc::UnboundedReceiver<Notice>,
        Credential,
    ) {
        let store = Arc::new(FakeStore::with_list(list));
        let (mut cache, rx) = cache_with(Arc::clone(&store));
        let cred = credential("tok");
        cache.load(Some(&cred)).await.unwrap();
        (store, cache, rx, cred)
    }

    fn ids(cache: &TransactionCache<FakeStore>) -> Vec<&str> {
        cache.records().iter().map(|t| t.id.as_str()).collect()
    }

    // ===== load =====

    #[tokio::test]
    async fn test_load_replaces_records_with_store_list() {
        let (store, cache, _rx, _) = loaded(vec![record("1", TransactionType::Expense, 10)]).await;

        assert_eq!(cache.records(), &[record("1", TransactionType::Expense, 10)]);
        assert!(!cache.is_loading());
        assert!(cache.last_error().is_none());
        assert!(cache.synced_at().is_some());
        assert_eq!(store.calls(), vec!["list tok"]);
    }

    #[tokio::test]
    async fn test_load_without_credential_clears_and_skips_network() {
        let (store, mut cache, _rx, _) =
            loaded(vec![record("1", TransactionType::Expense, 10)]).await;

        cache.load(None).await.unwrap();

        assert!(cache.records().is_empty());
        assert!(!cache.is_loading());
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_load_with_blank_token_counts_as_signed_out() {
        let store = Arc::new(FakeStore::default());
        let (mut cache, _rx) = cache_with(Arc::clone(&store));

        cache.load(Some(&credential(""))).await.unwrap();

        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_loading_flag_is_published_while_request_in_flight() {
        let store = Arc::new(FakeStore::with_list(vec![record("1", TransactionType::Income, 10)]));
        store.state.lock().unwrap().gated = true;
        let (mut cache, _rx) = cache_with(Arc::clone(&store));
        let mut snapshots = cache.subscribe();
        let cred = credential("tok");

        let observe = async {
            snapshots.changed().await.unwrap();
            let in_flight = snapshots.borrow_and_update().clone();
            store.gate.notify_one();
            in_flight
        };
        let (result, in_flight) = tokio::join!(cache.load(Some(&cred)), observe);

        result.unwrap();
        assert!(in_flight.loading);
        assert!(in_flight.records.is_empty());
        assert!(!cache.is_loading());
        assert!(!snapshots.borrow().loading);
        assert_eq!(snapshots.borrow().records.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_records_and_sets_sticky_error() {
        let (store, mut cache, mut rx, cred) =
            loaded(vec![record("1", TransactionType::Income, 100)]).await;
        store.fail_with(500, "");

        let err = cache.load(Some(&cred)).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to fetch transactions.");
        assert_eq!(ids(&cache), vec!["1"]);
        assert_eq!(cache.last_error(), Some("Failed to fetch transactions."));
        assert!(!cache.is_loading());
        assert_eq!(drain(&mut rx), vec![Notice::error("Failed to fetch transactions.")]);

        // Cleared by the next successful load
        cache.load(Some(&cred)).await.unwrap();
        assert!(cache.last_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_first_load_leaves_empty_records() {
        let store = Arc::new(FakeStore::default());
        store.fail_with(401, r#"{"message":"Not authorized, token failed"}"#);
        let (mut cache, _rx) = cache_with(Arc::clone(&store));

        assert!(cache.load(Some(&credential("stale"))).await.is_err());

        assert!(cache.records().is_empty());
        assert_eq!(cache.last_error(), Some("Not authorized, token failed"));
    }

    // ===== sync_credential =====

    #[tokio::test]
    async fn test_sync_credential_reloads_only_on_session_change() {
        let store = Arc::new(FakeStore::with_list(vec![record("1", TransactionType::Expense, 5)]));
        let (mut cache, _rx) = cache_with(Arc::clone(&store));
        let first = credential("tok-a");

        // Initial observation, signed out: clears without a request
        assert!(cache.sync_credential(None).await.unwrap());
        assert!(!cache.sync_credential(None).await.unwrap());

        // Sign in
        assert!(cache.sync_credential(Some(&first)).await.unwrap());
        assert_eq!(ids(&cache), vec!["1"]);

        // Same token again is not a change, even as a new value
        assert!(!cache.sync_credential(Some(&credential("tok-a"))).await.unwrap());

        // Re-login with a new token
        assert!(cache.sync_credential(Some(&credential("tok-b"))).await.unwrap());

        // Logout
        assert!(cache.sync_credential(None).await.unwrap());
        assert!(cache.records().is_empty());

        assert_eq!(store.calls(), vec!["list tok-a", "list tok-b"]);
    }

    // ===== add =====

    #[tokio::test]
    async fn test_add_prepends_in_call_order() {
        let (_store, mut cache, _rx, cred) =
            loaded(vec![record("seed", TransactionType::Expense, 1)]).await;

        for title in ["Rent", "Coffee", "Salary"] {
            let before = cache.records().len();
            cache
                .add(Some(&cred), draft(TransactionType::Expense, title, 10))
                .await
                .unwrap();
            assert_eq!(cache.records().len(), before + 1);
        }

        let titles: Vec<&str> = cache.records().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Salary", "Coffee", "Rent", "Seed"]);
    }

    #[tokio::test]
    async fn test_add_uses_server_assigned_id() {
        let (_store, mut cache, mut rx, cred) =
            loaded(vec![record("1", TransactionType::Expense, 10)]).await;

        let created = cache
            .add(Some(&cred), draft(TransactionType::Income, "Salary", 5000))
            .await
            .unwrap();

        assert_eq!(created.id, "srv-1");
        assert_eq!(ids(&cache), vec!["srv-1", "1"]);
        assert_eq!(cache.records()[0].amount, Decimal::from(5000));
        assert_eq!(drain(&mut rx), vec![Notice::success("Transaction added successfully!")]);
    }

    #[tokio::test]
    async fn test_add_without_credential_fails_without_request() {
        let store = Arc::new(FakeStore::default());
        let (mut cache, mut rx) = cache_with(Arc::clone(&store));

        let err = cache
            .add(None, draft(TransactionType::Income, "Salary", 5000))
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::NotAuthenticated));
        assert!(store.calls().is_empty());
        let notices = drain(&mut rx);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "You must be logged in to add a transaction.");
    }

    #[tokio::test]
    async fn test_add_failure_leaves_records_unchanged() {
        let (store, mut cache, _rx, cred) =
            loaded(vec![record("1", TransactionType::Expense, 10)]).await;
        store.fail_with(500, "");

        let err = cache
            .add(Some(&cred), draft(TransactionType::Expense, "Lunch", 12))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to add transaction.");
        assert_eq!(ids(&cache), vec!["1"]);
    }

    #[tokio::test]
    async fn test_add_triggers_alert_check_in_background() {
        let (store, mut cache, _rx, cred) = loaded(Vec::new()).await;
        store.state.lock().unwrap().alert_failure = true;

        let result = cache
            .add(Some(&cred), draft(TransactionType::Expense, "Lunch", 12))
            .await;
        assert!(result.is_ok());

        cache.finish_background().await;
        assert_eq!(store.calls(), vec!["list tok", "create", "check-alerts"]);
        assert_eq!(cache.records().len(), 1);
    }

    // ===== update =====

    #[tokio::test]
    async fn test_update_replaces_only_matching_entry() {
        let (store, mut cache, _rx, cred) = loaded(vec![
            record("a", TransactionType::Expense, 1),
            record("b", TransactionType::Expense, 2),
            record("c", TransactionType::Expense, 3),
        ])
        .await;

        let mut edited = cache.find("b").unwrap().clone();
        edited.title = "Groceries".to_string();
        edited.amount = Decimal::from(45);

        let updated = cache.update(Some(&cred), &edited).await.unwrap();

        assert_eq!(updated.as_ref().map(|t| t.title.as_str()), Some("Groceries"));
        assert_eq!(ids(&cache), vec!["a", "b", "c"]);
        assert_eq!(cache.records()[1].amount, Decimal::from(45));
        assert_eq!(cache.records()[0].amount, Decimal::from(1));
        assert_eq!(store.calls().last().unwrap(), "update b");
    }

    #[tokio::test]
    async fn test_update_rejection_surfaces_server_message() {
        let (store, mut cache, mut rx, cred) =
            loaded(vec![record("1", TransactionType::Expense, 10)]).await;
        drain(&mut rx);
        store.fail_with(400, r#"{"message":"Validation failed"}"#);

        let mut edited = record("1", TransactionType::Expense, 10);
        edited.amount = Decimal::from(-5);
        let err = cache.update(Some(&cred), &edited).await.unwrap_err();

        assert_eq!(err.to_string(), "Validation failed");
        assert_eq!(cache.records(), &[record("1", TransactionType::Expense, 10)]);
        assert_eq!(drain(&mut rx), vec![Notice::error("Validation failed")]);
    }

    #[tokio::test]
    async fn test_update_without_credential_is_noop() {
        let (store, mut cache, _rx, _) =
            loaded(vec![record("1", TransactionType::Expense, 10)]).await;

        let result = cache.update(None, &record("1", TransactionType::Income, 99)).await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(store.calls().len(), 1);
        assert_eq!(cache.records()[0].kind, TransactionType::Expense);
    }

    // ===== delete =====

    #[tokio::test]
    async fn test_delete_removes_exactly_one_entry() {
        let (_store, mut cache, mut rx, cred) = loaded(vec![
            record("a", TransactionType::Expense, 1),
            record("b", TransactionType::Income, 2),
            record("c", TransactionType::Expense, 3),
        ])
        .await;

        assert!(cache.delete(Some(&cred), "b").await.unwrap());

        assert_eq!(ids(&cache), vec!["a", "c"]);
        assert_eq!(drain(&mut rx), vec![Notice::success("Transaction deleted successfully!")]);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_records_unchanged() {
        let (store, mut cache, _rx, cred) =
            loaded(vec![record("a", TransactionType::Expense, 1)]).await;
        store.fail_with(404, "");

        let err = cache.delete(Some(&cred), "a").await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to delete transaction.");
        assert_eq!(ids(&cache), vec!["a"]);
    }

    #[tokio::test]
    async fn test_delete_without_credential_is_noop() {
        let (store, mut cache, _rx, _) =
            loaded(vec![record("a", TransactionType::Expense, 1)]).await;

        assert!(!cache.delete(None, "a").await.unwrap());
        assert_eq!(ids(&cache), vec!["a"]);
        assert_eq!(store.calls().len(), 1);
    }

    // ===== read model =====

    #[tokio::test]
    async fn test_subscribers_see_each_change() {
        let store = Arc::new(FakeStore::with_list(vec![record("1", TransactionType::Income, 10)]));
        let (mut cache, _rx) = cache_with(Arc::clone(&store));
        let mut snapshots = cache.subscribe();
        let cred = credential("tok");

        cache.load(Some(&cred)).await.unwrap();
        assert!(snapshots.has_changed().unwrap());
        let snapshot = snapshots.borrow_and_update().clone();
        assert_eq!(snapshot.records.len(), 1);
        assert!(!snapshot.loading);

        cache.delete(Some(&cred), "1").await.unwrap();
        assert!(snapshots.borrow_and_update().records.is_empty());
    }

    #[tokio::test]
    async fn test_totals_and_sync_display() {
        let store = Arc::new(FakeStore::default());
        let (cache, _rx) = cache_with(store);
        assert_eq!(cache.synced_display(), "never");

        let (_store, cache, _rx, _) = loaded(vec![
            record("1", TransactionType::Income, 300),
            record("2", TransactionType::Expense, 120),
        ])
        .await;
        assert_eq!(cache.totals().balance(), Decimal::from(180));
        assert_eq!(cache.synced_display(), "just now");
    }
}
