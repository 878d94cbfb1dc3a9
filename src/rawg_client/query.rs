//! Query presets for the collection endpoints.

use chrono::{Days, NaiveDate};

/// Provider path for every collection query.
pub const GAMES_ENDPOINT: &str = "/games";

/// A fixed upstream query behind one of the `/games` routes.
///
/// # Example
///
/// ```rust,ignore
/// let query = CollectionQuery::search("zelda");
/// let games = client.fetch_games(&query).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionQuery {
    /// Unfiltered collection
    All,
    /// Release date, newest first
    Latest,
    /// Rating, highest first
    Popular,
    /// Metacritic score, highest first
    Metacritic,
    /// Games releasing between two dates, soonest first
    Upcoming { from: NaiveDate, to: NaiveDate },
    /// Free-text search
    Search(String),
}

impl CollectionQuery {
    /// Upcoming releases from `today` through `today + window_days`.
    pub fn upcoming(today: NaiveDate, window_days: u32) -> Self {
        let to = today
            .checked_add_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MAX);
        CollectionQuery::Upcoming { from: today, to }
    }

    pub fn search(term: impl Into<String>) -> Self {
        CollectionQuery::Search(term.into())
    }

    /// Short name used in logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            CollectionQuery::All => "all",
            CollectionQuery::Latest => "latest",
            CollectionQuery::Popular => "popular",
            CollectionQuery::Metacritic => "metacritic",
            CollectionQuery::Upcoming { .. } => "upcoming",
            CollectionQuery::Search(_) => "search",
        }
    }

    /// Query parameters sent upstream, before credentials and paging.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            CollectionQuery::All => Vec::new(),
            CollectionQuery::Latest => vec![("ordering", "-released".to_string())],
            CollectionQuery::Popular => vec![("ordering", "-rating".to_string())],
            CollectionQuery::Metacritic => vec![("ordering", "-metacritic".to_string())],
            CollectionQuery::Upcoming { from, to } => vec![
                ("dates", format!("{},{}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))),
                ("ordering", "released".to_string()),
            ],
            CollectionQuery::Search(term) => vec![("search", term.clone())],
        }
    }
}
