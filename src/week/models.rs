use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable numeric id of a pool participant ("pigeon number")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PigeonId(pub u32);

impl fmt::Display for PigeonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u32);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
}

impl GameStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Some(GameStatus::Scheduled),
            "in_progress" => Some(GameStatus::InProgress),
            "final" => Some(GameStatus::Final),
            _ => None,
        }
    }
}

/// One game of the week as reported by the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub id: GameId,
    /// Home team code, e.g. "KC"
    pub home: String,
    /// Away team code
    pub away: String,
    pub status: GameStatus,
    /// Home minus away points; `None` until score data exists
    pub diff: Option<i32>,
    pub kickoff: DateTime<Utc>,
}

/// A player's predicted margin for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub pigeon: PigeonId,
    pub game: GameId,
    /// Signed margin, positive = home by that much. `None` = no pick submitted.
    pub margin: Option<i32>,
}

/// Accumulated weekly score for one player (lower is better)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub pigeon: PigeonId,
    pub name: String,
    pub total: i32,
}

/// How games that have kicked off but are not final are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivePolicy {
    /// Live scores are already part of the standings; only scheduled games are open.
    #[default]
    TreatAsFinal,
    /// Live games are enumerated as well; their current contribution is backed out.
    TreatAsOpen,
}

/// Largest margin, score or penalty accepted anywhere in the input.
pub const MAX_MARGIN: i32 = 200;

/// Closed range of signed margins the solver enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginDomain {
    pub min: i32,
    pub max: i32,
}

impl Default for MarginDomain {
    fn default() -> Self {
        MarginDomain { min: -40, max: 40 }
    }
}

impl MarginDomain {
    pub fn new(min: i32, max: i32) -> anyhow::Result<Self> {
        // -1, 0 and +1 must all be interior-or-boundary points of the domain
        if min > -2 || max < 2 {
            anyhow::bail!("margin domain [{}, {}] must include -2..=2", min, max);
        }
        if min < -MAX_MARGIN || max > MAX_MARGIN {
            anyhow::bail!("margin domain [{}, {}] exceeds ±{}", min, max, MAX_MARGIN);
        }
        Ok(MarginDomain { min, max })
    }

    pub fn clamp(&self, v: i32) -> i32 {
        v.clamp(self.min, self.max)
    }

    pub fn width(&self) -> usize {
        (i64::from(self.max) - i64::from(self.min) + 1) as usize
    }
}

/// Everything the solver needs for one week, already validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSnapshot {
    pub week: u8,
    pub games: Vec<GameOutcome>,
    pub picks: Vec<Pick>,
    pub standings: Vec<PlayerStanding>,
}

impl WeekSnapshot {
    pub fn player_index(&self, pigeon: PigeonId) -> Option<usize> {
        self.standings.iter().position(|s| s.pigeon == pigeon)
    }

    pub fn game(&self, id: GameId) -> Option<&GameOutcome> {
        self.games.iter().find(|g| g.id == id)
    }

    /// Predicted margin for (pigeon, game); `None` when no pick exists.
    /// Submitted margins keyed by (pigeon, game), for repeated lookups.
    pub fn pick_table(&self) -> HashMap<(PigeonId, GameId), i32> {
        self.picks
            .iter()
            .filter_map(|p| p.margin.map(|m| ((p.pigeon, p.game), m)))
            .collect()
    }

    pub fn pick_for(&self, pigeon: PigeonId, game: GameId) -> Option<i32> {
        self.picks
            .iter()
            .find(|p| p.pigeon == pigeon && p.game == game)
            .and_then(|p| p.margin)
    }

    /// Games whose result is still being enumerated, in kickoff order.
    pub fn open_games(&self, policy: LivePolicy) -> Vec<&GameOutcome> {
        let mut open: Vec<&GameOutcome> = self
            .games
            .iter()
            .filter(|g| match g.status {
                GameStatus::Scheduled => true,
                GameStatus::InProgress => policy == LivePolicy::TreatAsOpen,
                GameStatus::Final => false,
            })
            .collect();
        open.sort_by_key(|g| (g.kickoff, g.id));
        open
    }
}
