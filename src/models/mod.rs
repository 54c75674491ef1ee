//! Models Module
//!
//! Read models assembled from the chat platform and kept in the cache.

mod read_model;

pub use read_model::{GuildInfo, ReadModel, UserInfo};
