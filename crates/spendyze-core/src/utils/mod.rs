//! Utility functions for display formatting.

pub mod format;

pub use format::{age_display, format_amount, format_signed_amount, truncate_string};
