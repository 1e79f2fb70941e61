//! Outcome grid for the last one or two open games ("Monday night" view).
//!
//! Unlike rule extraction, every cell is reported as-is: who wins it and how
//! the top of the table groups up.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::error::{SolverError, MAX_GRID_GAMES};
use super::intervals::Interval;
use super::ranking::Placement;
use super::scenarios::ScenarioSpace;
use super::SolverOptions;
use crate::week::models::{GameId, PigeonId, PlayerStanding, WeekSnapshot};

/// Players sharing one placement in a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankGroup {
    pub rank: usize,
    pub tied: bool,
    pub pigeons: Vec<PigeonId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridAxis {
    pub game: GameId,
    pub home: String,
    pub away: String,
    pub intervals: Vec<Interval>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridCell {
    /// Interval index per axis
    pub coords: Vec<usize>,
    /// Representative margin per axis
    pub margins: Vec<i32>,
    pub winners: Vec<PigeonId>,
    pub top_groups: Vec<RankGroup>,
}

/// Best top-k finish of a player who never wins any cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestFinish {
    pub pigeon: PigeonId,
    pub name: String,
    pub best_rank: usize,
    /// False when the best rank can be reached outright somewhere
    pub tied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeGrid {
    pub axes: Vec<GridAxis>,
    pub cells: Vec<GridCell>,
    pub best_finish_for_non_leaders: Vec<BestFinish>,
}

impl OutcomeGrid {
    /// Cells are stored row-major, so the lookup is positional.
    pub fn cell(&self, coords: &[usize]) -> Option<&GridCell> {
        if coords.len() != self.axes.len() {
            return None;
        }
        let mut flat = 0;
        for (&c, axis) in coords.iter().zip(&self.axes) {
            let len = axis.intervals.len();
            if c >= len {
                return None;
            }
            flat = flat * len + c;
        }
        self.cells.get(flat)
    }
}

fn top_groups(roster: &[PlayerStanding], placements: &[Placement], top_k: usize) -> Vec<RankGroup> {
    let mut groups: BTreeMap<Placement, Vec<PigeonId>> = BTreeMap::new();
    for (player, p) in placements.iter().enumerate() {
        if p.rank <= top_k {
            groups.entry(*p).or_default().push(roster[player].pigeon);
        }
    }
    groups
        .into_iter()
        .map(|(p, mut pigeons)| {
            pigeons.sort();
            RankGroup {
                rank: p.rank,
                tied: p.tied,
                pigeons,
            }
        })
        .collect()
}

/// For every player never ranked first in any cell, the best placement in
/// `2..=top_k` they reach anywhere. Players who never make the top k are left out.
pub fn best_finishes(roster: &[PlayerStanding], cells: &[Vec<Placement>], top_k: usize) -> Vec<BestFinish> {
    let mut out = Vec::new();
    for (player, standing) in roster.iter().enumerate() {
        let mut ever_first = false;
        let mut best: Option<Placement> = None;
        for cell in cells {
            let p = cell[player];
            if p.rank == 1 {
                ever_first = true;
                break;
            }
            if p.rank <= top_k && best.map_or(true, |b| p < b) {
                best = Some(p);
            }
        }
        if ever_first {
            continue;
        }
        if let Some(b) = best {
            out.push(BestFinish {
                pigeon: standing.pigeon,
                name: standing.name.clone(),
                best_rank: b.rank,
                tied: b.tied,
            });
        }
    }
    out.sort_by(|a, b| {
        (a.best_rank, a.tied, &a.name, a.pigeon).cmp(&(b.best_rank, b.tied, &b.name, b.pigeon))
    });
    out
}

/// Winners and top-k groups for every combination of the open games' intervals.
pub fn grid_for_open_games(snapshot: &WeekSnapshot, opts: &SolverOptions) -> Result<OutcomeGrid, SolverError> {
    let open = snapshot.open_games(opts.live_policy).len();
    if open > MAX_GRID_GAMES {
        warn!("Refusing outcome grid for week {}: {} open games", snapshot.week, open);
        return Err(SolverError::TooManyOpenGames {
            open,
            limit: MAX_GRID_GAMES,
        });
    }

    let space = ScenarioSpace::build(snapshot, opts);
    let roster = &snapshot.standings;

    let mut all_placements = Vec::with_capacity(space.len());
    let mut cells = Vec::with_capacity(space.len());
    for flat in 0..space.len() {
        let coords = space.coords(flat);
        let placements = space.cell_placements(flat);
        let winners = placements
            .iter()
            .enumerate()
            .filter(|(_, p)| p.rank == 1)
            .map(|(i, _)| roster[i].pigeon)
            .collect();
        cells.push(GridCell {
            margins: space.margins(&coords),
            coords,
            winners,
            top_groups: top_groups(roster, &placements, opts.top_k),
        });
        all_placements.push(placements);
    }
    debug!("Week {} grid: {} cells", snapshot.week, cells.len());

    Ok(OutcomeGrid {
        axes: space
            .games()
            .iter()
            .map(|g| GridAxis {
                game: g.game.id,
                home: g.game.home.clone(),
                away: g.game.away.clone(),
                intervals: g.intervals.clone(),
            })
            .collect(),
        cells,
        best_finish_for_non_leaders: best_finishes(roster, &all_placements, opts.top_k),
    })
}
