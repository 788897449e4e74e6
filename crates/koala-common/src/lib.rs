//! Common utilities for the Koala browser.
//!
//! This crate provides shared infrastructure used by the DOM crates:
//! - **Warning System** - colored, deduplicated terminal diagnostics for
//!   conditions that are not errors but should not go unnoticed

pub mod warning;

pub use warning::{Component, clear_warnings, warn, warn_once};
