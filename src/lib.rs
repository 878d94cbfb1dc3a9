//! # GameHub
//!
//! A small HTTP façade over the RAWG video game database. It re-exposes a
//! handful of RAWG queries under one stable JSON shape and puts a fixed set
//! of request policies in front of them:
//!
//! - **Stable schema**: every provider record goes through one normalizer
//! - **Policies**: security headers, body cap, per-client rate limiting,
//!   input validation, request deadline
//! - **Observability**: request IDs, structured logging, Prometheus metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Headers → Body Cap → Rate Limit → Validation)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (/games, /games/{preset}, /games/{id})            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RawgClient → normalize()                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RAWG API (HTTPS, key-authenticated)                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gamehub::{AppState, Config, build_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gamehub::AppError> {
//!     let config = Config::from_env()?;
//!     let state = AppState::from_config(config)?;
//!     let app = build_router(state);
//!
//!     // Start the server...
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```bash
//! RAWG_API_KEY=your-key PORT=8080 cargo run
//! ```
//!
//! Disable rate limiting:
//! ```bash
//! RATE_LIMIT_WINDOW_MS=0 cargo run
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod normalize;
pub mod rawg_client;
pub mod routes;
pub mod state;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use rawg_client::{CollectionQuery, RawgClient, RawgError};
pub use routes::build_router;
pub use state::AppState;
