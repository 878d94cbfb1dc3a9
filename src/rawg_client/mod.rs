//! HTTP client for the RAWG game database.
//!
//! The client owns one pooled [`reqwest::Client`] and exposes two reads:
//!
//! - [`RawgClient::fetch_collection`] / [`RawgClient::fetch_games`] for list
//!   endpoints, decoded through [`UpstreamEnvelope`]
//! - [`RawgClient::fetch_by_id`] for a single game
//!
//! Every result passes through [`normalize`] before leaving this module.
//!
//! # Request Construction
//!
//! ```text
//! base_url + endpoint ? <query params> & key=<credential> & page_size=N [& stores=...]
//! ```
//!
//! The endpoint is checked against `[a-zA-Z0-9/_?=&-]` before anything else
//! happens, then the credential is required. Both failures are returned
//! without touching the network. Query values (search terms, date ranges)
//! are appended as encoded pairs and never spliced into the endpoint.
//!
//! # Failure Model
//!
//! Single attempt, no retries. A transport failure or timeout is
//! [`RawgError::UpstreamUnavailable`]; a body that does not decode is
//! [`RawgError::UpstreamMalformed`]. Non-2xx statuses are logged and the body
//! is decoded anyway, so RAWG's `{"detail":"Not found."}` becomes a zero-id
//! record and [`RawgClient::fetch_by_id`] reports it as `None`.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = RawgClient::new(&config)?;
//! let popular = client.fetch_games(&CollectionQuery::Popular).await?;
//! let game = client.fetch_by_id("3498").await?;
//! ```

mod query;

use std::sync::Arc;
use std::time::Instant;

use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{GameRecord, RawGame, UpstreamEnvelope};
use crate::normalize::normalize;
use crate::validation::check_endpoint;

pub use query::{CollectionQuery, GAMES_ENDPOINT};

// =============================================================================
// Constants
// =============================================================================

/// User agent sent on every upstream request.
pub const USER_AGENT: &str = "GameHub/1.0";

/// Characters that would change the shape of a `/games/{id}` URL.
const ID_RESERVED_CHARS: [char; 4] = ['/', '?', '=', '&'];

/// Replaces the credential in logged URLs.
const REDACTED: &str = "REDACTED";

// =============================================================================
// Errors
// =============================================================================

/// Failures of an upstream fetch.
///
/// None of these messages are shown to API clients; handlers wrap them in
/// [`AppError::Upstream`] with a fixed public message.
#[derive(Error, Debug)]
pub enum RawgError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("RAWG_API_KEY is not configured")]
    MissingCredential,

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("malformed upstream response: {0}")]
    UpstreamMalformed(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RawgError {
    /// Metric label for this failure.
    fn outcome(&self) -> &'static str {
        match self {
            RawgError::UpstreamMalformed(_) => "malformed",
            RawgError::UpstreamUnavailable(_) => "unavailable",
            RawgError::InvalidEndpoint(_)
            | RawgError::MissingCredential
            | RawgError::InvalidArgument(_) => "rejected",
        }
    }
}

// =============================================================================
// RawgClient
// =============================================================================

/// Cheap-to-clone handle to the RAWG API.
///
/// Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct RawgClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
    page_size: u32,
    store_filter: Arc<str>,
}

impl std::fmt::Debug for RawgClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawgClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .field("page_size", &self.page_size)
            .field("store_filter", &self.store_filter)
            .finish_non_exhaustive()
    }
}

impl RawgClient {
    /// Build a client from configuration.
    ///
    /// A missing credential is not an error here; fetches fail with
    /// [`RawgError::MissingCredential`] instead.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        let api_key = config
            .rawg_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(Arc::from);

        Ok(Self {
            http,
            base_url: Arc::from(config.rawg_base_url.trim_end_matches('/')),
            api_key,
            page_size: config.page_size,
            store_filter: Arc::from(config.store_filter.trim()),
        })
    }

    /// Fetch one page of games from an arbitrary collection endpoint.
    ///
    /// # Errors
    ///
    /// See [`RawgError`].
    pub async fn fetch_collection(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<GameRecord>, RawgError> {
        self.collection("collection", endpoint, params).await
    }

    /// Fetch one page of games for a preset query.
    ///
    /// # Errors
    ///
    /// See [`RawgError`].
    pub async fn fetch_games(&self, query: &CollectionQuery) -> Result<Vec<GameRecord>, RawgError> {
        self.collection(query.name(), GAMES_ENDPOINT, &query.params())
            .await
    }

    /// Fetch a single game by provider id or slug.
    ///
    /// Returns `Ok(None)` when the provider answers with a record whose id is
    /// zero, which is how a missing game decodes.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `id` is empty
    /// - `InvalidEndpoint` if `id` contains characters outside the endpoint
    ///   charset or any of `/ ? = &`
    /// - otherwise see [`RawgError`]
    #[instrument(skip(self), fields(operation = "game"))]
    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<GameRecord>, RawgError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(RawgError::InvalidArgument("game id is required".to_string()));
        }
        if id.contains(ID_RESERVED_CHARS) {
            return Err(RawgError::InvalidEndpoint(format!(
                "game id contains a reserved character: {}",
                id.escape_debug()
            )));
        }

        let endpoint = format!("{GAMES_ENDPOINT}/{id}");
        let url = self.build_url(&endpoint, &[], false)?;
        let raw: RawGame = self.get_json("game", url).await?;

        if raw.id == 0 {
            debug!("Upstream returned no game");
            return Ok(None);
        }
        Ok(Some(normalize(raw)))
    }

    #[instrument(skip(self, params), fields(param_count = params.len()))]
    async fn collection(
        &self,
        operation: &'static str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<GameRecord>, RawgError> {
        let url = self.build_url(endpoint, params, true)?;
        let envelope: UpstreamEnvelope = self.get_json(operation, url).await?;

        debug!(
            count = envelope.count,
            returned = envelope.results.len(),
            "Fetched collection"
        );
        Ok(envelope.results.into_iter().map(normalize).collect())
    }

    /// Assemble the outbound URL.
    ///
    /// Order of checks: endpoint charset, then credential.
    fn build_url(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        with_store_filter: bool,
    ) -> Result<Url, RawgError> {
        check_endpoint(endpoint).map_err(RawgError::InvalidEndpoint)?;
        let key = self.api_key.as_deref().ok_or(RawgError::MissingCredential)?;

        let mut url = Url::parse(&format!("{}{endpoint}", self.base_url))
            .map_err(|e| RawgError::InvalidEndpoint(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
            pairs.append_pair("key", key);
            pairs.append_pair("page_size", &self.page_size.to_string());
            if with_store_filter && !self.store_filter.is_empty() {
                pairs.append_pair("stores", &self.store_filter);
            }
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
    ) -> Result<T, RawgError> {
        let started = Instant::now();
        let result = self.send(operation, url).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        metrics::record_upstream_request(operation, outcome, started.elapsed().as_secs_f64());
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
    ) -> Result<T, RawgError> {
        debug!(operation, url = %redact_key(&url), "Requesting upstream");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RawgError::UpstreamUnavailable(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                operation,
                status = status.as_u16(),
                "Upstream returned non-success status"
            );
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RawgError::UpstreamUnavailable(e.without_url().to_string()))?;

        serde_json::from_slice(&body).map_err(|e| RawgError::UpstreamMalformed(e.to_string()))
    }
}

/// Copy of `url` with the `key` parameter masked, for logging.
fn redact_key(url: &Url) -> Url {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == "key" {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}
