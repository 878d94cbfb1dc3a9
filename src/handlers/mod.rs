mod games;

pub use games::{
    get_game, latest_games, list_games, metacritic_games, popular_games, search_games,
    upcoming_games,
};
