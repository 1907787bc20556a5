//! Authentication module for the signed-in session.
//!
//! This module provides:
//! - `Credential`: the bearer token and user profile of a session
//! - `Session`: persistence of the credential across runs
//!
//! The session lives in `session.json` under the cache directory until
//! logout clears it.

pub mod session;

pub use session::{Credential, Session};
