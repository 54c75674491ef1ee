//! Cache key conventions for read models.

/// Key under which a guild's read model is cached.
pub fn guild_key(guild_id: u64) -> String {
    format!("guild:{}", guild_id)
}

/// Key under which a user's read model is cached.
pub fn user_key(user_id: u64) -> String {
    format!("user:{}", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_scoped_by_kind() {
        assert_eq!(guild_key(42), "guild:42");
        assert_eq!(user_key(42), "user:42");
        assert_ne!(guild_key(7), user_key(7));
    }
}
