//! # Tabwatch Common Library
//!
//! Shared code for the tabwatch services including:
//! - Error and result types
//! - Bootstrap configuration loading and data folder resolution
//! - Line-oriented list files (followed artists, favorites)
//! - Local wall-clock helpers for the daily sync trigger

pub mod config;
pub mod error;
pub mod list_file;
pub mod time;

pub use error::{Error, Result};
