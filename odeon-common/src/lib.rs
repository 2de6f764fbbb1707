//! # Odeon Common Library
//!
//! Shared code for the Odeon back-office services:
//! - Error types
//! - Configuration loading
//! - Keyed TTL cache capability

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{MemoryCache, TtlCache};
pub use config::Settings;
pub use error::{Error, Result};
