//! Guild Cache - An in-process read-model cache
//!
//! Runs the cache alongside a simulated read-model consumer that resolves
//! guild and user info through `get_or_set`, the way bot commands do.

use std::time::Duration;

use anyhow::Context;
use chrono::{TimeZone, Utc};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use guild_cache::keys::{guild_key, user_key};
use guild_cache::models::{GuildInfo, ReadModel, UserInfo};
use guild_cache::{CacheService, Config};

const GUILD_IDS: [u64; 3] = [1001, 1002, 1003];
const USER_IDS: [u64; 2] = [42, 77];
const CONSUMER_TICK: Duration = Duration::from_secs(5);

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the cache service and its cleanup task
/// 4. Run the read-model consumer until SIGINT/SIGTERM
/// 5. Stop the cache service
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guild_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Guild Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cleanup_interval={}s, sweep_chunk_size={}, guild_ttl={}s, user_ttl={}s",
        config.cleanup_interval, config.sweep_chunk_size, config.guild_ttl, config.user_ttl
    );

    let cache: CacheService<ReadModel> = CacheService::start(&config)?;

    tokio::select! {
        _ = run_consumer(cache.clone(), config) => {}
        _ = shutdown_signal() => {}
    }

    cache.stop().await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves every known guild and user each tick and logs the cache state.
async fn run_consumer(cache: CacheService<ReadModel>, config: Config) {
    let mut ticker = tokio::time::interval(CONSUMER_TICK);

    loop {
        ticker.tick().await;

        for guild_id in GUILD_IDS {
            // Two lookups race on the same key; only one builds the model
            let (first, second) = tokio::join!(
                guild_info(&cache, &config, guild_id),
                guild_info(&cache, &config, guild_id),
            );
            match first.and(second) {
                Ok(guild) => info!(guild = %guild.name, members = guild.member_count, "Guild resolved"),
                Err(e) => warn!("Guild {} unavailable: {:#}", guild_id, e),
            }
        }

        for user_id in USER_IDS {
            let key = user_key(user_id);
            let resolved = cache
                .get_or_set(&key, || build_user(user_id), config.user_ttl())
                .await;
            if let Err(e) = resolved {
                warn!("User {} unavailable: {}", user_id, e);
            }
        }

        let stats = cache.stats().await;
        match serde_json::to_string(&stats) {
            Ok(json) => info!("Cache stats: {}", json),
            Err(e) => warn!("Failed to encode stats: {}", e),
        }
    }
}

/// Resolves a guild through the cache.
///
/// A non-guild model under a guild key is a key collision, reported apart
/// from factory failures.
async fn guild_info(
    cache: &CacheService<ReadModel>,
    config: &Config,
    guild_id: u64,
) -> anyhow::Result<GuildInfo> {
    let key = guild_key(guild_id);
    let model = cache
        .get_or_set(&key, || build_guild(guild_id), config.guild_ttl())
        .await?;
    model
        .as_guild()
        .cloned()
        .with_context(|| format!("cached model under {} is not a guild", key))
}

/// Stand-in for the platform call that assembles a guild read model.
async fn build_guild(guild_id: u64) -> anyhow::Result<ReadModel> {
    tokio::time::sleep(Duration::from_millis(150)).await;
    info!("Built guild read model for {}", guild_id);
    let members = 50 + (guild_id % 100) as u32 * 3;
    Ok(GuildInfo::new(guild_id, format!("guild-{}", guild_id), members, 12).into())
}

/// Stand-in for the platform call that assembles a user read model.
async fn build_user(user_id: u64) -> anyhow::Result<ReadModel> {
    tokio::time::sleep(Duration::from_millis(80)).await;
    info!("Built user read model for {}", user_id);
    let created_at = Utc
        .timestamp_opt(1_600_000_000 + user_id as i64 * 86_400, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("invalid creation time for user {}", user_id))?;
    Ok(UserInfo::new(user_id, format!("user-{}", user_id), false, created_at).into())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
