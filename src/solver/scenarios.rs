//! Cross-product enumeration of interval choices across the open games.
//!
//! Cells are addressed row-major: the first open game is the outermost axis,
//! the last one the innermost.

use serde::Serialize;
use tracing::debug;

use super::intervals::{partition, Interval};
use super::ranking::{placement_of, placements, Placement};
use super::SolverOptions;
use crate::week::models::{GameOutcome, GameStatus, WeekSnapshot};

/// One open game with its intervals and every player's score per interval.
#[derive(Debug, Clone)]
pub struct OpenGame {
    pub game: GameOutcome,
    pub intervals: Vec<Interval>,
    /// `scores[interval][player]`
    scores: Vec<Vec<i32>>,
}

impl OpenGame {
    pub fn score(&self, interval: usize, player: usize) -> i32 {
        self.scores[interval][player]
    }
}

/// One full assignment of representative outcomes to the open games.
#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    /// Interval index chosen per open game
    pub coords: Vec<usize>,
    /// Representative margin per open game
    pub margins: Vec<i32>,
    /// Resulting weekly total per player, in roster order
    pub totals: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct ScenarioSpace {
    games: Vec<OpenGame>,
    base: Vec<i32>,
    dims: Vec<usize>,
}

impl ScenarioSpace {
    /// Partition every open game and precompute per-interval scores.
    ///
    /// Callers are expected to have checked the open-game limit already.
    pub fn build(snapshot: &WeekSnapshot, opts: &SolverOptions) -> Self {
        let open = snapshot.open_games(opts.live_policy);
        let mut base: Vec<i32> = snapshot.standings.iter().map(|s| s.total).collect();
        let picks = snapshot.pick_table();

        let mut games = Vec::with_capacity(open.len());
        for game in open {
            let preds: Vec<Option<i32>> = snapshot
                .standings
                .iter()
                .map(|s| picks.get(&(s.pigeon, game.id)).copied())
                .collect();

            // live results already counted in the standings are backed out
            if game.status == GameStatus::InProgress {
                if let Some(diff) = game.diff {
                    for (total, pred) in base.iter_mut().zip(&preds) {
                        *total = (*total).saturating_sub(opts.rules.score(*pred, diff));
                    }
                }
            }

            let intervals = partition(opts.domain, &preds, &opts.rules);
            let scores = intervals
                .iter()
                .map(|iv| preds.iter().map(|p| opts.rules.score(*p, iv.rep)).collect())
                .collect();
            debug!(
                "{} {}@{}: {} intervals",
                game.id,
                game.away,
                game.home,
                intervals.len()
            );
            games.push(OpenGame {
                game: game.clone(),
                intervals,
                scores,
            });
        }

        let dims = games.iter().map(|g| g.intervals.len()).collect();
        ScenarioSpace { games, base, dims }
    }

    pub fn games(&self) -> &[OpenGame] {
        &self.games
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of cells; a space with no open games has exactly one.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn coords(&self, mut flat: usize) -> Vec<usize> {
        let mut coords = vec![0; self.dims.len()];
        for (axis, &d) in self.dims.iter().enumerate().rev() {
            coords[axis] = flat % d;
            flat /= d;
        }
        coords
    }

    pub fn flat(&self, coords: &[usize]) -> usize {
        coords
            .iter()
            .zip(&self.dims)
            .fold(0, |acc, (&c, &d)| acc * d + c)
    }

    pub fn margins(&self, coords: &[usize]) -> Vec<i32> {
        coords
            .iter()
            .zip(&self.games)
            .map(|(&c, g)| g.intervals[c].rep)
            .collect()
    }

    pub fn totals(&self, coords: &[usize]) -> Vec<i32> {
        let mut totals = self.base.clone();
        for (g, &c) in self.games.iter().zip(coords) {
            for (player, total) in totals.iter_mut().enumerate() {
                *total = (*total).saturating_add(g.score(c, player));
            }
        }
        totals
    }

    pub fn scenario(&self, flat: usize) -> Scenario {
        let coords = self.coords(flat);
        Scenario {
            margins: self.margins(&coords),
            totals: self.totals(&coords),
            coords,
        }
    }

    pub fn scenarios(&self) -> impl Iterator<Item = Scenario> + '_ {
        (0..self.len()).map(move |flat| self.scenario(flat))
    }

    /// The subject's placement in every cell, indexed by flat cell number.
    pub fn subject_placements(&self, subject: usize) -> Vec<Placement> {
        self.scenarios()
            .map(|s| placement_of(&s.totals, subject))
            .collect()
    }

    /// Everyone's placement in one cell.
    pub fn cell_placements(&self, flat: usize) -> Vec<Placement> {
        placements(&self.scenario(flat).totals)
    }
}
