use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AuthResponse, User};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Bearer token plus the profile it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
            created_at: Utc::now(),
        }
    }

    /// A credential is only usable with a non-empty token
    pub fn is_valid(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl From<AuthResponse> for Credential {
    fn from(auth: AuthResponse) -> Self {
        Credential::new(auth.token, auth.user)
    }
}

pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<Credential>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns whether a usable credential was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            let data: Credential = serde_json::from_str(&contents)
                .context("Failed to parse session file")?;

            if data.is_valid() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data (logout)
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with a new credential
    pub fn update(&mut self, data: Credential) {
        self.data = Some(data);
    }

    /// The credential, if the session holds a usable one
    pub fn credential(&self) -> Option<&Credential> {
        self.data.as_ref().filter(|d| d.is_valid())
    }

    pub fn user(&self) -> Option<&User> {
        self.credential().map(|d| &d.user)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user() -> User {
        User {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_session_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(dir.path().to_path_buf());
        session.update(Credential::new("tok-1", user()));
        session.save().unwrap();

        let mut restored = Session::new(dir.path().to_path_buf());
        assert!(restored.load().unwrap());
        assert_eq!(restored.credential().unwrap().token, "tok-1");
        assert_eq!(restored.user().unwrap().email, "ada@example.com");
    }

    #[test]
    fn test_session_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(dir.path().to_path_buf());
        session.update(Credential::new("tok-1", user()));
        session.save().unwrap();

        session.clear().unwrap();

        assert!(session.credential().is_none());
        assert!(!dir.path().join(SESSION_FILE).exists());
        let mut restored = Session::new(dir.path().to_path_buf());
        assert!(!restored.load().unwrap());
    }

    #[test]
    fn test_blank_token_is_not_a_credential() {
        let mut session = Session::new(PathBuf::from("unused"));
        session.update(Credential::new("  ", user()));
        assert!(session.credential().is_none());
    }

    #[test]
    fn test_credential_from_auth_response() {
        let auth: AuthResponse = serde_json::from_str(
            r#"{"token":"jwt","user":{"name":"Ada","email":"ada@example.com"}}"#,
        )
        .unwrap();
        let credential = Credential::from(auth);
        assert_eq!(credential.token, "jwt");
        assert_eq!(credential.user, user());
    }
}
