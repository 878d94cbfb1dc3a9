mod game;
mod rawg;

pub use game::{GameRecord, StoreLink};
pub use rawg::{
    RawGame, RawGenre, RawPlatform, RawPlatformEntry, RawStore, RawStoreEntry, UpstreamEnvelope,
};
