//! Guild Cache - An in-process read-model cache
//!
//! Provides TTL expiration, background sweeping, and single-flight cache-aside loading.

pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod service;
pub mod tasks;

pub use cache::CacheStats;
pub use config::Config;
pub use error::{CacheError, Result};
pub use service::CacheService;
