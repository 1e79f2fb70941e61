pub mod cache;
pub mod models;
pub mod parse;
pub mod provider;
pub mod sources;

pub use cache::CachedProvider;
pub use models::{
    GameId, GameOutcome, GameStatus, LivePolicy, MarginDomain, Pick, PigeonId, PlayerStanding,
    WeekSnapshot,
};
pub use parse::{assemble_week, parse_week_document, ParseError};
pub use provider::WeekProvider;
pub use sources::{FileProvider, RestProvider};
