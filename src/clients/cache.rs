//! Time-bounded caching of the built client.
//!
//! # Overview
//!
//! Building a client resolves auth (possibly awaiting a caller callback) and
//! assembles the pipeline, so [`ClientCache`] keeps the result for
//! [`CLIENT_TTL_SECONDS`]. The entry is rebuilt when:
//!
//! - no client has been built yet,
//! - it was invalidated (explicitly, or by an `invalid_token` response), or
//! - it is older than the TTL.
//!
//! Concurrent callers share a single build: the slot is guarded by an async
//! mutex that is held for the duration of the build.
//!
//! # Generations
//!
//! Each build gets a generation number. The [`CacheInvalidator`] handed to a
//! client's pipeline only clears the slot while it still holds that
//! generation, so a late `invalid_token` from an old client cannot evict a
//! newer one.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::api::ApiRoot;
use crate::auth::resolve_auth;
use crate::clients::pipeline::Pipeline;
use crate::config::ClientConfig;
use crate::error::ConfigError;

/// How long a built client stays valid.
pub const CLIENT_TTL_SECONDS: i64 = 900;

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Returns a [`Clock`] reading the system time.
#[must_use]
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

#[derive(Debug)]
struct CachedClient {
    root: ApiRoot,
    created_at: DateTime<Utc>,
    generation: u64,
}

#[derive(Debug, Default)]
struct Slot {
    cached: Option<CachedClient>,
    generation: u64,
}

/// Caches the [`ApiRoot`] built from a [`ClientConfig`].
pub struct ClientCache {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    slot: Arc<Mutex<Slot>>,
    clock: Clock,
}

// Verify ClientCache is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientCache>();
    assert_send_sync::<CacheInvalidator>();
};

impl ClientCache {
    /// Creates an empty cache using the system clock.
    #[must_use]
    pub fn new(config: Arc<ClientConfig>, http: reqwest::Client) -> Self {
        Self::with_clock(config, http, system_clock())
    }

    /// Creates an empty cache reading time from `clock`.
    #[must_use]
    pub fn with_clock(config: Arc<ClientConfig>, http: reqwest::Client, clock: Clock) -> Self {
        Self {
            config,
            http,
            slot: Arc::new(Mutex::new(Slot::default())),
            clock,
        }
    }

    /// Returns the cached client, building a new one if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if auth cannot be resolved. The cache stays
    /// empty in that case.
    pub async fn get(&self) -> Result<ApiRoot, ConfigError> {
        let mut slot = self.slot.lock().await;
        let now = (self.clock)();
        let ttl = chrono::Duration::seconds(CLIENT_TTL_SECONDS);

        if let Some(cached) = &slot.cached {
            if now - cached.created_at <= ttl {
                return Ok(cached.root.clone());
            }
            tracing::debug!(
                "Cached client (generation {}) expired, rebuilding",
                cached.generation
            );
            slot.cached = None;
        }

        let generation = slot.generation + 1;
        let invalidator = CacheInvalidator {
            slot: Arc::downgrade(&self.slot),
            generation,
        };
        let root = self.build(invalidator).await?;

        tracing::debug!(
            "Built commercetools client for project {} (generation {})",
            self.config.project_key(),
            generation
        );
        slot.generation = generation;
        slot.cached = Some(CachedClient {
            root: root.clone(),
            created_at: now,
            generation,
        });
        Ok(root)
    }

    /// Drops the cached client; the next [`get`](Self::get) rebuilds.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.cached.take().is_some() {
            tracing::debug!("Cached commercetools client invalidated");
        }
    }

    /// Returns `true` if a client is cached, regardless of its age.
    pub async fn is_cached(&self) -> bool {
        self.slot.lock().await.cached.is_some()
    }

    /// Returns the configuration clients are built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn build(&self, invalidator: CacheInvalidator) -> Result<ApiRoot, ConfigError> {
        let strategy = resolve_auth(self.config.auth(), self.config.env(), &self.http).await?;
        let pipeline =
            Pipeline::from_config(&self.config, self.http.clone(), strategy, Some(invalidator));
        Ok(ApiRoot::new(Arc::new(pipeline)))
    }
}

impl std::fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Evicts one generation of a [`ClientCache`].
///
/// Holds the cache weakly, so a pipeline outliving its cache does nothing.
#[derive(Clone, Debug)]
pub struct CacheInvalidator {
    slot: Weak<Mutex<Slot>>,
    generation: u64,
}

impl CacheInvalidator {
    /// Clears the cache if it still holds this invalidator's generation.
    /// Returns `true` if an entry was removed.
    pub async fn invalidate(&self) -> bool {
        let Some(slot) = self.slot.upgrade() else {
            return false;
        };
        let mut slot = slot.lock().await;
        if slot
            .cached
            .as_ref()
            .is_some_and(|cached| cached.generation == self.generation)
        {
            slot.cached = None;
            true
        } else {
            false
        }
    }
}
