use serde::{Deserialize, Serialize};

/// A game in the stable external shape served by every `/games` endpoint.
///
/// Field names are part of the public contract and must not change when
/// the provider's payload does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Provider identifier, rendered as a string
    pub id: String,
    pub title: String,
    /// HTML description (only populated by single-game lookups)
    pub description: String,
    pub background_image: String,
    /// Genre names in provider order
    pub genres: Vec<String>,
    /// Average rating, 0.0 to 5.0
    pub rating: f64,
    /// Upper bound of the rating scale
    pub rating_top: u32,
    /// ISO date (`YYYY-MM-DD`), empty when unknown
    pub release_date: String,
    /// Number of users who added the game to a library
    pub added: u64,
    /// Metacritic score, 0 when not rated
    pub metacritic: u32,
    /// Average playtime in hours
    pub playtime: u32,
    /// Last provider update timestamp
    pub updated: String,
    #[serde(rename = "reviews_count")]
    pub reviews: u64,
    /// Platform names in provider order
    pub platforms: Vec<String>,
    pub stores: Vec<StoreLink>,
}

/// Where a game can be bought.
///
/// `url` is never empty: the normalizer synthesizes a search URL when the
/// provider does not supply one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLink {
    pub id: u64,
    pub name: String,
    pub url: String,
    /// Store badge image
    pub image: String,
}
