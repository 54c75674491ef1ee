//! Read model DTOs
//!
//! Snapshot views of guilds and users. One cache instance holds both kinds,
//! so they share the tagged [`ReadModel`] enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of a guild as shown by info commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildInfo {
    pub id: u64,
    pub name: String,
    pub member_count: u32,
    pub channel_count: u32,
    /// When the snapshot was assembled
    pub fetched_at: DateTime<Utc>,
}

impl GuildInfo {
    pub fn new(id: u64, name: impl Into<String>, member_count: u32, channel_count: u32) -> Self {
        Self {
            id,
            name: name.into(),
            member_count,
            channel_count,
            fetched_at: Utc::now(),
        }
    }
}

/// Summary of a user as shown by info commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: u64,
    pub username: String,
    pub bot: bool,
    pub created_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

impl UserInfo {
    pub fn new(id: u64, username: impl Into<String>, bot: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            username: username.into(),
            bot,
            created_at,
            fetched_at: Utc::now(),
        }
    }
}

/// Any read model the cache may hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadModel {
    Guild(GuildInfo),
    User(UserInfo),
}

impl ReadModel {
    pub fn as_guild(&self) -> Option<&GuildInfo> {
        match self {
            ReadModel::Guild(guild) => Some(guild),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserInfo> {
        match self {
            ReadModel::User(user) => Some(user),
            _ => None,
        }
    }
}

impl From<GuildInfo> for ReadModel {
    fn from(guild: GuildInfo) -> Self {
        ReadModel::Guild(guild)
    }
}

impl From<UserInfo> for ReadModel {
    fn from(user: UserInfo) -> Self {
        ReadModel::User(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_model_accessors() {
        let model = ReadModel::from(GuildInfo::new(1, "rustaceans", 120, 14));

        assert_eq!(model.as_guild().map(|g| g.member_count), Some(120));
        assert!(model.as_user().is_none());
    }

    #[test]
    fn test_read_model_serializes_with_kind_tag() {
        let model = ReadModel::from(UserInfo::new(9, "ferris", false, Utc::now()));

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["kind"], "user");
        assert_eq!(json["username"], "ferris");

        let back: ReadModel = serde_json::from_value(json).unwrap();
        assert_eq!(back, model);
    }
}
