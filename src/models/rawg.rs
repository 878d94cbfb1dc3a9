//! Wire types for the RAWG provider.
//!
//! RAWG omits fields or sends `null` freely (`metacritic`, `released`,
//! `background_image`, `platforms`, ...). Every field decodes to its zero
//! value in that case so a sparse record never fails the whole page.

use serde::{Deserialize, Deserializer};

/// Decode `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Paginated list envelope returned by collection endpoints.
///
/// Only `results` is consumed; `next`/`previous` are never followed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawGame>,
}

/// A game as the provider sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGame {
    /// 0 when absent; a zero id means "no such game"
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub released: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub background_image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating_top: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub added: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metacritic: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub playtime: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<RawGenre>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub platforms: Vec<RawPlatformEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stores: Vec<RawStoreEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGenre {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Platform wrapper: `{"platform": {"id": 4, "name": "PC"}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlatformEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub platform: RawPlatform,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlatform {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Store wrapper: `{"id": 3, "url": "...", "store": {...}}`.
///
/// Detail responses carry the purchase link in the outer `url`; list
/// responses usually omit it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStoreEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub store: RawStore,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStore {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_background: String,
}
