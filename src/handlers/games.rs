//! Game endpoints.
//!
//! # Endpoints
//!
//! - `GET /games` - Unfiltered collection
//! - `GET /games/latest` - Newest releases first
//! - `GET /games/popular` - Highest rated first
//! - `GET /games/metacritic` - Highest Metacritic score first
//! - `GET /games/upcoming` - Releases from today through the configured window
//! - `GET /games/search?q=` - Free-text search
//! - `GET /games/{id}` - Single game by id or slug
//!
//! Collection failures answer `500 {"error":"Internal server error"}` and
//! single-game failures `500 {"error":"Failed to fetch game"}`; the cause
//! is only logged.

use axum::Json;
use axum::extract::{Path, RawQuery, State};
use chrono::Utc;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::{AppError, AppResult, COLLECTION_FETCH_FAILED, GAME_FETCH_FAILED};
use crate::models::GameRecord;
use crate::rawg_client::CollectionQuery;
use crate::state::AppState;

/// Name of the search term parameter.
const SEARCH_PARAM: &str = "q";

async fn collection(state: &AppState, query: CollectionQuery) -> AppResult<Json<Vec<GameRecord>>> {
    let games = state
        .rawg
        .fetch_games(&query)
        .await
        .map_err(|e| AppError::upstream(e, COLLECTION_FETCH_FAILED))?;
    Ok(Json(games))
}

#[instrument(skip(state))]
pub async fn list_games(State(state): State<AppState>) -> AppResult<Json<Vec<GameRecord>>> {
    collection(&state, CollectionQuery::All).await
}

#[instrument(skip(state))]
pub async fn latest_games(State(state): State<AppState>) -> AppResult<Json<Vec<GameRecord>>> {
    collection(&state, CollectionQuery::Latest).await
}

#[instrument(skip(state))]
pub async fn popular_games(State(state): State<AppState>) -> AppResult<Json<Vec<GameRecord>>> {
    collection(&state, CollectionQuery::Popular).await
}

#[instrument(skip(state))]
pub async fn metacritic_games(State(state): State<AppState>) -> AppResult<Json<Vec<GameRecord>>> {
    collection(&state, CollectionQuery::Metacritic).await
}

/// Upcoming releases, computed from today's UTC date on every request.
#[instrument(skip(state))]
pub async fn upcoming_games(State(state): State<AppState>) -> AppResult<Json<Vec<GameRecord>>> {
    let today = Utc::now().date_naive();
    let query = CollectionQuery::upcoming(today, state.config.upcoming_window_days);
    collection(&state, query).await
}

/// Search by free text.
///
/// The first `q` parameter is used; a missing or blank term is a 400.
#[instrument(skip(state))]
pub async fn search_games(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Vec<GameRecord>>> {
    let term = query
        .as_deref()
        .and_then(search_term)
        .ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))?;

    collection(&state, CollectionQuery::search(term)).await
}

fn search_term(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == SEARCH_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|term| !term.is_empty())
}

/// Single game lookup. A provider miss is a 404, distinct from a failed fetch.
#[instrument(skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<GameRecord>> {
    let game = state
        .rawg
        .fetch_by_id(&id)
        .await
        .map_err(|e| AppError::upstream(e, GAME_FETCH_FAILED))?;

    game.map(Json)
        .ok_or_else(|| AppError::NotFound("Game not found".to_string()))
}
