//! Shared fixtures for solver tests.

use chrono::{Duration, TimeZone, Utc};

use crate::week::models::{
    GameId, GameOutcome, GameStatus, Pick, PigeonId, PlayerStanding, WeekSnapshot,
};

/// Game `id` with home team `H<id>` and away team `A<id>`, kicking off in id order.
pub fn game(id: u32, status: GameStatus, diff: Option<i32>) -> GameOutcome {
    GameOutcome {
        id: GameId(id),
        home: format!("H{}", id),
        away: format!("A{}", id),
        status,
        diff,
        kickoff: Utc.with_ymd_and_hms(2025, 10, 19, 17, 0, 0).unwrap() + Duration::hours(id as i64),
    }
}

/// Players get pigeon numbers 1, 2, ... in roster order; picks are
/// `(roster index, game id, margin)`.
pub fn snapshot(
    players: &[(&str, i32)],
    games: Vec<GameOutcome>,
    picks: &[(usize, u32, Option<i32>)],
) -> WeekSnapshot {
    WeekSnapshot {
        week: 7,
        games,
        picks: picks
            .iter()
            .map(|&(player, game, margin)| Pick {
                pigeon: PigeonId(player as u32 + 1),
                game: GameId(game),
                margin,
            })
            .collect(),
        standings: players
            .iter()
            .enumerate()
            .map(|(i, (name, total))| PlayerStanding {
                pigeon: PigeonId(i as u32 + 1),
                name: name.to_string(),
                total: *total,
            })
            .collect(),
    }
}
