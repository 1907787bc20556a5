//! Command handling for the spendyze client.
//!
//! `App` wires the session, API client and transaction cache together.
//! The session's credential is handed to the cache on every call; notices
//! from the cache are collected on a channel and printed after each
//! command.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use spendyze_core::models::ChatMessage;
use spendyze_core::notify::drain;
use spendyze_core::utils::{format_amount, format_signed_amount, truncate_string};
use spendyze_core::{
    ApiClient, ChannelNotifier, Config, Credential, Notice, Session, Transaction,
    TransactionCache, TransactionDraft, TransactionType,
};

use crate::args::{AddArgs, EditArgs};

/// Transactions shown on the dashboard
const DASHBOARD_RECENT: usize = 5;

/// Column width for titles in listings
const TITLE_WIDTH: usize = 28;

const LOGIN_REQUIRED: &str = "You must be logged in to use this feature.";

pub struct App {
    config: Config,
    session: Session,
    api: ApiClient,
    cache: TransactionCache<ApiClient>,
    notices: mpsc::UnboundedReceiver<Notice>,
}

impl App {
    pub fn new(api_url: Option<String>) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let mut session = Session::new(cache_dir);
        if let Err(e) = session.load() {
            warn!(error = %e, "Failed to load session");
        }

        let api_url = api_url.unwrap_or_else(|| config.api_url());
        debug!(api_url = %api_url, "API host");
        let api = ApiClient::new(api_url)?;

        let (notifier, notices) = ChannelNotifier::new();
        let cache = TransactionCache::new(Arc::new(api.clone()), Arc::new(notifier));

        Ok(Self {
            config,
            session,
            api,
            cache,
            notices,
        })
    }

    /// Bring the cache in line with the stored session
    pub async fn sync(&mut self) {
        // Failures are already reported as notices
        let _ = self.cache.sync_credential(self.session.credential()).await;
    }

    /// Wait for side calls started by the last command
    pub async fn finish_background(&mut self) {
        self.cache.finish_background().await;
    }

    /// Print queued notices. Returns whether any of them was an error.
    pub fn flush_notices(&mut self) -> bool {
        let mut had_error = false;
        for notice in drain(&mut self.notices) {
            if notice.is_error() {
                had_error = true;
                eprintln!("{}", notice);
            } else {
                println!("{}", notice);
            }
        }
        had_error
    }

    fn token(&self) -> Result<String> {
        self.session
            .credential()
            .map(|c| c.token.clone())
            .ok_or_else(|| anyhow::anyhow!(LOGIN_REQUIRED))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(email) => email,
            None => prompt("Email: ")?,
        };
        let password = rpassword::prompt_password("Password: ")?;

        let auth = self
            .api
            .login(&email, &password)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message("Login failed.")))?;

        self.start_session(email, auth.into()).await;
        Ok(())
    }

    pub async fn signup(&mut self, name: String, email: String) -> Result<()> {
        let password = rpassword::prompt_password("Password: ")?;
        let confirm = rpassword::prompt_password("Confirm password: ")?;
        if password != confirm {
            anyhow::bail!("Passwords do not match.");
        }

        let auth = self
            .api
            .register(&name, &email, &password)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message("Signup failed.")))?;

        self.start_session(email, auth.into()).await;
        Ok(())
    }

    async fn start_session(&mut self, email: String, credential: Credential) {
        info!(email = %email, "Signed in");
        println!("Signed in as {} <{}>", credential.user.name, credential.user.email);

        self.session.update(credential);
        if let Err(e) = self.session.save() {
            warn!(error = %e, "Failed to save session");
        }

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.sync().await;
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.session.clear().context("Failed to remove session")?;
        self.sync().await;
        println!("Signed out.");
        Ok(())
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    pub fn dashboard(&self) -> Result<()> {
        let user = self
            .session
            .user()
            .ok_or_else(|| anyhow::anyhow!(LOGIN_REQUIRED))?;
        let totals = self.cache.totals();

        println!("{} <{}>  (synced {})", user.name, user.email, self.cache.synced_display());
        println!();
        println!("  Income   {:>14}", format_amount(totals.income));
        println!("  Expenses {:>14}", format_amount(totals.expense));
        println!("  Balance  {:>14}", format_amount(totals.balance()));

        let recent: Vec<&Transaction> =
            self.cache.records().iter().take(DASHBOARD_RECENT).collect();
        if !recent.is_empty() {
            println!();
            println!("Recent");
            print_table(&recent);
        }
        Ok(())
    }

    pub fn list(&self, kind: Option<TransactionType>) -> Result<()> {
        self.token()?;
        let records: Vec<&Transaction> = self
            .cache
            .records()
            .iter()
            .filter(|t| kind.map_or(true, |k| t.kind == k))
            .collect();

        if records.is_empty() {
            if let Some(error) = self.cache.last_error() {
                anyhow::bail!("{}", error);
            }
            println!("No transactions yet.");
        } else {
            print_table(&records);
        }
        Ok(())
    }

    pub async fn add(&mut self, args: AddArgs) -> Result<()> {
        let draft = TransactionDraft {
            kind: args.kind,
            title: args.title,
            amount: args.amount,
            date: args.date.map(start_of_day).unwrap_or_else(Utc::now),
            category: args.category,
            description: args.description,
        };
        self.add_draft(draft).await
    }

    async fn add_draft(&mut self, draft: TransactionDraft) -> Result<()> {
        let created = self.cache.add(self.session.credential(), draft).await?;
        print_table(&[&created]);
        Ok(())
    }

    pub async fn edit(&mut self, args: EditArgs) -> Result<()> {
        self.token()?;
        let mut transaction = self
            .cache
            .find(&args.id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No transaction with id {}", args.id))?;
        apply_edits(&mut transaction, args);

        if let Some(updated) = self.cache.update(self.session.credential(), &transaction).await? {
            print_table(&[&updated]);
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.token()?;
        self.cache.delete(self.session.credential(), id).await?;
        Ok(())
    }

    // =========================================================================
    // AI
    // =========================================================================

    pub async fn summary(&self) -> Result<()> {
        let token = self.token()?;
        println!("Generating...");
        let summary = self
            .api
            .fetch_summary(&token)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message("Failed to generate summary.")))?;
        println!("{}", summary);
        Ok(())
    }

    pub async fn scan(&mut self, path: &Path, add: bool) -> Result<()> {
        let token = self.token()?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let image = base64::engine::general_purpose::STANDARD.encode(bytes);

        let bill = self
            .api
            .scan_bill(&token, &image)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message("Failed to scan the bill.")))?;

        println!("Title:    {}", bill.title.as_deref().unwrap_or("-"));
        println!(
            "Amount:   {}",
            bill.amount.map(format_amount).unwrap_or_else(|| "-".to_string())
        );
        println!(
            "Date:     {}",
            bill.date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        println!("Category: {}", bill.category.as_deref().unwrap_or("-"));

        if add {
            let draft = bill
                .into_draft(Utc::now())
                .ok_or_else(|| anyhow::anyhow!("The scan is missing a title or amount."))?;
            self.add_draft(draft).await?;
        }
        Ok(())
    }

    /// Read questions from stdin until an empty line or EOF
    pub async fn chat(&self) -> Result<()> {
        let token = self.token()?;
        let mut history: Vec<ChatMessage> = Vec::new();
        let stdin = io::stdin();

        println!("Ask about your finances. Empty line to quit.");
        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let question = line.trim();
            if question.is_empty() {
                break;
            }

            history.push(ChatMessage::user(question));
            match self.api.chat(&token, &history).await {
                Ok(text) => {
                    println!("{}\n", text);
                    history.push(ChatMessage::bot(text));
                }
                Err(e) => {
                    // Drop the unanswered question so the history stays paired
                    history.pop();
                    eprintln!("✗ {}", e.user_message("Failed to get a response from the chatbot."));
                }
            }
        }
        Ok(())
    }

    pub async fn budget(&self) -> Result<()> {
        let token = self.token()?;
        let budget = self
            .api
            .fetch_budget_recommendation(&token)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message("Failed to generate budget.")))?;

        for line in &budget.budget {
            println!("  {:<24} {:>12}", truncate_string(&line.category, 24), format_amount(line.amount));
        }
        println!("  {:<24} {:>12}", "Total", format_amount(budget.total()));
        if let Some(advice) = budget.advice {
            println!();
            println!("{}", advice);
        }
        Ok(())
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Overwrite the fields given on the command line. An empty description
/// is kept as `""` so the store clears its copy.
fn apply_edits(transaction: &mut Transaction, args: EditArgs) {
    if let Some(kind) = args.kind {
        transaction.kind = kind;
    }
    if let Some(title) = args.title {
        transaction.title = title;
    }
    if let Some(amount) = args.amount {
        transaction.amount = amount;
    }
    if let Some(category) = args.category {
        transaction.category = category;
    }
    if let Some(date) = args.date {
        transaction.date = start_of_day(date);
    }
    if let Some(description) = args.description {
        transaction.description = Some(description);
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn print_table(records: &[&Transaction]) {
    for t in records {
        println!(
            "{:<26} {:<12} {:<8} {:<width$} {:<14} {:>14}",
            t.id,
            t.formatted_date(),
            t.kind.to_string(),
            truncate_string(&t.title, TITLE_WIDTH),
            truncate_string(&t.category, 14),
            format_signed_amount(t.signed_amount()),
            width = TITLE_WIDTH,
        );
    }
}
