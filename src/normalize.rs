//! Mapping from the provider's record shape to [`GameRecord`].
//!
//! [`normalize`] is the only conversion path: collection and single-game
//! lookups both go through it, so the external shape cannot drift between
//! endpoints.
//!
//! # Purchase URLs
//!
//! RAWG list responses rarely include a store link. When a store entry has
//! no URL, one is built from the store name and the game title:
//!
//! | Store (case-insensitive) | Template |
//! |---|---|
//! | `steam` | `https://store.steampowered.com/search/?term={title}` |
//! | `playstation store` | `https://store.playstation.com/search/{title}` |
//! | `xbox store` | `https://www.xbox.com/games/search?q={title}` |
//! | `nintendo` | `https://www.nintendo.com/search/?q={title}&p=1&cat=gme` |
//! | `gog` | `https://www.gog.com/games?query={title}` |
//! | `epic games` | `https://store.epicgames.com/browse?q={title}` |
//! | anything else | `https://www.google.com/search?q=buy+{title}+game` |
//!
//! The title is form-encoded (spaces become `+`) before substitution.

use url::form_urlencoded;

use crate::models::{GameRecord, RawGame, RawStoreEntry, StoreLink};

/// Placeholder replaced by the encoded game title.
const TITLE_PLACEHOLDER: &str = "{title}";

/// Known storefronts, keyed by lowercase display name.
const STORE_URL_TEMPLATES: [(&str, &str); 6] = [
    ("steam", "https://store.steampowered.com/search/?term={title}"),
    ("playstation store", "https://store.playstation.com/search/{title}"),
    ("xbox store", "https://www.xbox.com/games/search?q={title}"),
    ("nintendo", "https://www.nintendo.com/search/?q={title}&p=1&cat=gme"),
    ("gog", "https://www.gog.com/games?query={title}"),
    ("epic games", "https://store.epicgames.com/browse?q={title}"),
];

/// Fallback for storefronts not in [`STORE_URL_TEMPLATES`].
const SEARCH_URL_TEMPLATE: &str = "https://www.google.com/search?q=buy+{title}+game";

/// Convert a provider record into the external [`GameRecord`].
///
/// Pure and deterministic. Genre, platform and store order is preserved and
/// nothing is deduplicated.
pub fn normalize(raw: RawGame) -> GameRecord {
    let stores = raw
        .stores
        .into_iter()
        .map(|entry| store_link(entry, &raw.name))
        .collect();

    GameRecord {
        id: raw.id.to_string(),
        title: raw.name,
        description: raw.description,
        background_image: raw.background_image,
        genres: raw.genres.into_iter().map(|g| g.name).collect(),
        rating: raw.rating,
        rating_top: raw.rating_top,
        release_date: raw.released,
        added: raw.added,
        metacritic: raw.metacritic,
        playtime: raw.playtime,
        updated: raw.updated,
        reviews: raw.reviews_count,
        platforms: raw.platforms.into_iter().map(|p| p.platform.name).collect(),
        stores,
    }
}

fn store_link(entry: RawStoreEntry, title: &str) -> StoreLink {
    let RawStoreEntry { url, store } = entry;

    let url = [url, store.url]
        .into_iter()
        .map(|u| u.trim().to_string())
        .find(|u| !u.is_empty())
        .unwrap_or_else(|| store_purchase_url(&store.name, title));

    StoreLink {
        id: store.id,
        name: store.name,
        url,
        image: store.image_background,
    }
}

/// Build a purchase/search URL for `title` on the named store.
///
/// Always returns a non-empty URL.
pub fn store_purchase_url(store_name: &str, title: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(title.as_bytes()).collect();
    let key = store_name.trim().to_lowercase();

    let template = STORE_URL_TEMPLATES
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(SEARCH_URL_TEMPLATE, |&(_, template)| template);

    template.replace(TITLE_PLACEHOLDER, &encoded)
}
