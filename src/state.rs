//! Shared application state for Axum handlers.
//!
//! Everything here is either immutable or internally synchronized, so the
//! state is cloned freely per request:
//!
//! - **Upstream client**: pooled RAWG client, stateless per call
//! - **Configuration**: read-only after startup
//! - **Rate limiter**: the only shared mutable state, guarded by its own lock

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppResult;
use crate::middleware::ClientRateLimiter;
use crate::rawg_client::RawgClient;

/// Shared application state for Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream game database client
    pub rawg: RawgClient,
    /// Application configuration
    pub config: Arc<Config>,
    /// Per-client rate-limit slots, owned here and handed to the layer
    pub rate_limiter: Arc<ClientRateLimiter>,
}

impl AppState {
    /// Assemble state from an existing client.
    pub fn new(rawg: RawgClient, config: Config) -> Self {
        let rate_limiter = Arc::new(ClientRateLimiter::new(
            config.rate_limit_window,
            config.rate_limit_idle_ttl,
        ));

        Self {
            rawg,
            config: Arc::new(config),
            rate_limiter,
        }
    }

    /// Build the client and state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if the HTTP client cannot be built.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let rawg = RawgClient::new(&config)?;
        Ok(Self::new(rawg, config))
    }
}
