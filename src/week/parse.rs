//! Validation of raw results-API rows into a [`WeekSnapshot`].
//!
//! The pool backend serves one row per (player, game) pick joined with game
//! metadata, plus a leaderboard row per player. Nothing past this module
//! sees the raw rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use super::models::{
    GameId, GameOutcome, GameStatus, Pick, PigeonId, PlayerStanding, WeekSnapshot, MAX_MARGIN,
};

pub const FIRST_WEEK: u8 = 1;
pub const LAST_WEEK: u8 = 18;

/// Pick row joined with game metadata, as served by `/results/weeks/{week}/picks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekPicksRow {
    pub pigeon_number: u32,
    pub pigeon_name: String,
    pub game_id: u32,
    pub week_number: u8,
    pub picked_home: bool,
    /// Unsigned margin on the picked side; absent when no pick was made
    pub predicted_margin: Option<i32>,
    pub home_abbr: String,
    pub away_abbr: String,
    pub kickoff_at: DateTime<Utc>,
    pub status: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

/// Leaderboard row as served by `/results/weeks/{week}/leaderboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub pigeon_number: u32,
    pub pigeon_name: String,
    pub week_number: u8,
    pub score: i32,
    pub rank: u32,
    #[serde(default)]
    pub points: f64,
}

/// On-disk snapshot document: both row sets for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekDocument {
    pub week: u8,
    pub picks: Vec<WeekPicksRow>,
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardRow>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("week {0} is outside 1..=18")]
    WeekOutOfRange(u8),

    #[error("row for week {found} in a week {expected} document")]
    WeekMismatch { expected: u8, found: u8 },

    #[error("game {game}: unknown status '{status}'")]
    UnknownStatus { game: u32, status: String },

    #[error("game {0}: rows disagree on teams, kickoff or score")]
    ConflictingGame(u32),

    #[error("pigeon {pigeon} has more than one pick for game {game}")]
    DuplicatePick { pigeon: u32, game: u32 },

    #[error("pigeon {pigeon}, game {game}: negative margin {margin}")]
    InvalidMargin { pigeon: u32, game: u32, margin: i32 },

    #[error("pigeon {pigeon}, game {game}: margin {margin} is above 200")]
    MarginOutOfRange { pigeon: u32, game: u32, margin: i32 },

    #[error("game {game}: score {score} is outside 0..=200")]
    ScoreOutOfRange { game: u32, score: i32 },

    #[error("pigeon {0} appears more than once on the leaderboard")]
    DuplicateStanding(u32),

    #[error("malformed week document: {0}")]
    Json(#[from] serde_json::Error),
}

fn check_week(expected: u8, found: u8) -> Result<(), ParseError> {
    if found != expected {
        return Err(ParseError::WeekMismatch { expected, found });
    }
    Ok(())
}

fn game_from_row(row: &WeekPicksRow) -> Result<GameOutcome, ParseError> {
    let status = GameStatus::parse(&row.status).ok_or_else(|| ParseError::UnknownStatus {
        game: row.game_id,
        status: row.status.clone(),
    })?;
    for score in [row.home_score, row.away_score].into_iter().flatten() {
        if !(0..=MAX_MARGIN).contains(&score) {
            return Err(ParseError::ScoreOutOfRange {
                game: row.game_id,
                score,
            });
        }
    }
    let diff = match (row.home_score, row.away_score) {
        (Some(h), Some(a)) => Some(h - a),
        _ => None,
    };
    Ok(GameOutcome {
        id: GameId(row.game_id),
        home: row.home_abbr.clone(),
        away: row.away_abbr.clone(),
        status,
        diff,
        kickoff: row.kickoff_at,
    })
}

/// Build a validated snapshot from the two row sets of one week.
pub fn assemble_week(
    week: u8,
    picks: &[WeekPicksRow],
    leaderboard: &[LeaderboardRow],
) -> Result<WeekSnapshot, ParseError> {
    if !(FIRST_WEEK..=LAST_WEEK).contains(&week) {
        return Err(ParseError::WeekOutOfRange(week));
    }

    let mut games: BTreeMap<u32, GameOutcome> = BTreeMap::new();
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut names: BTreeMap<u32, String> = BTreeMap::new();
    let mut out_picks = Vec::with_capacity(picks.len());

    for row in picks {
        check_week(week, row.week_number)?;

        let game = game_from_row(row)?;
        match games.get(&row.game_id) {
            Some(existing) if *existing != game => return Err(ParseError::ConflictingGame(row.game_id)),
            Some(_) => {}
            None => {
                games.insert(row.game_id, game);
            }
        }

        if !seen.insert((row.pigeon_number, row.game_id)) {
            return Err(ParseError::DuplicatePick {
                pigeon: row.pigeon_number,
                game: row.game_id,
            });
        }
        let margin = match row.predicted_margin {
            Some(m) if m < 0 => {
                return Err(ParseError::InvalidMargin {
                    pigeon: row.pigeon_number,
                    game: row.game_id,
                    margin: m,
                })
            }
            Some(m) if m > MAX_MARGIN => {
                return Err(ParseError::MarginOutOfRange {
                    pigeon: row.pigeon_number,
                    game: row.game_id,
                    margin: m,
                })
            }
            Some(m) if row.picked_home => Some(m),
            Some(m) => Some(-m),
            None => None,
        };
        out_picks.push(Pick {
            pigeon: PigeonId(row.pigeon_number),
            game: GameId(row.game_id),
            margin,
        });
        names
            .entry(row.pigeon_number)
            .or_insert_with(|| row.pigeon_name.clone());
    }

    let mut totals: BTreeMap<u32, i32> = BTreeMap::new();
    for row in leaderboard {
        check_week(week, row.week_number)?;
        if totals.insert(row.pigeon_number, row.score).is_some() {
            return Err(ParseError::DuplicateStanding(row.pigeon_number));
        }
        names.insert(row.pigeon_number, row.pigeon_name.clone());
    }

    let standings = names
        .into_iter()
        .map(|(number, name)| PlayerStanding {
            pigeon: PigeonId(number),
            name,
            total: totals.get(&number).copied().unwrap_or(0),
        })
        .collect();

    Ok(WeekSnapshot {
        week,
        games: games.into_values().collect(),
        picks: out_picks,
        standings,
    })
}

/// Parse a snapshot document (`{"week", "picks", "leaderboard"}`).
pub fn parse_week_document(raw: &str) -> Result<WeekSnapshot, ParseError> {
    let doc: WeekDocument = serde_json::from_str(raw)?;
    assemble_week(doc.week, &doc.picks, &doc.leaderboard)
}
