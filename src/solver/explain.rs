//! Reachable placements for one player and the rules that guarantee them.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use super::error::{SolverError, MAX_RULE_GAMES};
use super::ranking::{placement_of, Placement};
use super::rules::{pill_from_rect, sort_pills, RulePill};
use super::scenarios::ScenarioSpace;
use super::tiling::{FeasibilityMask, Rectangle};
use super::SolverOptions;
use crate::week::models::{GameId, GameStatus, PigeonId, WeekSnapshot};

/// How often a placement occurs across the enumerated scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementOption {
    pub placement: Placement,
    pub scenarios: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub pigeon: PigeonId,
    pub name: String,
    /// Whether a top-k finish is still possible
    pub achievable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_rank: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tie: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RulePill>,
    /// Every reachable placement, best first
    pub placements: Vec<PlacementOption>,
    pub open_games: Vec<GameId>,
    pub scenarios: usize,
}

struct Prepared {
    subject: usize,
    space: ScenarioSpace,
    cells: Vec<Placement>,
}

fn prepare(snapshot: &WeekSnapshot, pigeon: PigeonId, opts: &SolverOptions) -> Result<Prepared, SolverError> {
    let subject = snapshot
        .player_index(pigeon)
        .ok_or(SolverError::SubjectNotFound(pigeon))?;

    let open = snapshot.open_games(opts.live_policy).len();
    if open > MAX_RULE_GAMES {
        warn!(
            "Refusing to explain week {} for {}: {} open games",
            snapshot.week, pigeon, open
        );
        return Err(SolverError::TooManyOpenGames {
            open,
            limit: MAX_RULE_GAMES,
        });
    }

    let space = ScenarioSpace::build(snapshot, opts);
    let cells = space.subject_placements(subject);
    debug!(
        "Week {} {}: {} open games, {} scenarios",
        snapshot.week,
        pigeon,
        open,
        cells.len()
    );
    Ok(Prepared {
        subject,
        space,
        cells,
    })
}

fn pills_for(prep: &Prepared, snapshot: &WeekSnapshot, target: Placement, opts: &SolverOptions) -> Result<Vec<RulePill>, SolverError> {
    let mask = FeasibilityMask::from_fn(prep.space.dims(), |flat| prep.cells[flat] == target);
    let rects = mask.tile()?;
    debug!("{} cells for {} tiled into {} boxes", mask.count(), target, rects.len());

    let mut pills = Vec::with_capacity(rects.len());
    for rect in &rects {
        debug_assert!(
            verify_rectangle(snapshot, &prep.space, prep.subject, rect, target, opts),
            "box {:?} does not yield {}",
            rect,
            target
        );
        pills.push(pill_from_rect(&prep.space, rect, target, opts.domain));
    }
    sort_pills(&mut pills);
    Ok(pills)
}

/// Every reachable placement for `pigeon`, the best one, and up to
/// `opts.max_pills` rules for top-k targets.
pub fn explain_best_placement(
    snapshot: &WeekSnapshot,
    pigeon: PigeonId,
    opts: &SolverOptions,
) -> Result<Explanation, SolverError> {
    let prep = prepare(snapshot, pigeon, opts)?;

    let mut counts: BTreeMap<Placement, usize> = BTreeMap::new();
    for p in &prep.cells {
        *counts.entry(*p).or_default() += 1;
    }
    let best = counts.keys().next().copied();
    let achievable = best.is_some_and(|b| b.rank <= opts.top_k);

    let mut rules = Vec::new();
    if achievable {
        for target in counts.keys().filter(|p| p.rank <= opts.top_k) {
            if opts.max_pills.is_some_and(|cap| rules.len() >= cap) {
                break;
            }
            rules.extend(pills_for(&prep, snapshot, *target, opts)?);
        }
        if let Some(cap) = opts.max_pills {
            rules.truncate(cap);
        }
    }

    Ok(Explanation {
        pigeon,
        name: snapshot.standings[prep.subject].name.clone(),
        achievable,
        best_rank: best.map(|b| b.rank),
        tie: best.map(|b| b.tied),
        rules,
        placements: counts
            .into_iter()
            .map(|(placement, scenarios)| PlacementOption { placement, scenarios })
            .collect(),
        open_games: prep.space.games().iter().map(|g| g.game.id).collect(),
        scenarios: prep.cells.len(),
    })
}

/// All rules (uncapped) for one chosen placement; empty when it cannot happen.
pub fn explain_placement(
    snapshot: &WeekSnapshot,
    pigeon: PigeonId,
    target: Placement,
    opts: &SolverOptions,
) -> Result<Vec<RulePill>, SolverError> {
    let prep = prepare(snapshot, pigeon, opts)?;
    pills_for(&prep, snapshot, target, opts)
}

/// Weekly totals recomputed straight from the snapshot for the given margins
/// of the open games, without the precomputed score tables.
pub fn rescore(snapshot: &WeekSnapshot, opts: &SolverOptions, margins: &[(GameId, i32)]) -> Vec<i32> {
    rescore_with(snapshot, &snapshot.pick_table(), opts, margins)
}

fn rescore_with(
    snapshot: &WeekSnapshot,
    picks: &HashMap<(PigeonId, GameId), i32>,
    opts: &SolverOptions,
    margins: &[(GameId, i32)],
) -> Vec<i32> {
    snapshot
        .standings
        .iter()
        .map(|s| {
            let mut total = s.total;
            for &(game_id, margin) in margins {
                let pick = picks.get(&(s.pigeon, game_id)).copied();
                if let Some(game) = snapshot.game(game_id) {
                    if let (GameStatus::InProgress, Some(live)) = (game.status, game.diff) {
                        total = total.saturating_sub(opts.rules.score(pick, live));
                    }
                }
                total = total.saturating_add(opts.rules.score(pick, margin));
            }
            total
        })
        .collect()
}

/// Soundness check: every cell of `rect`, re-scored independently, gives the
/// subject the claimed placement.
pub fn verify_rectangle(
    snapshot: &WeekSnapshot,
    space: &ScenarioSpace,
    subject: usize,
    rect: &Rectangle,
    target: Placement,
    opts: &SolverOptions,
) -> bool {
    let picks = snapshot.pick_table();
    rect.all_cells(|coords| {
        let margins: Vec<(GameId, i32)> = space
            .games()
            .iter()
            .zip(space.margins(coords))
            .map(|(g, m)| (g.game.id, m))
            .collect();
        placement_of(&rescore_with(snapshot, &picks, opts, &margins), subject) == target
    })
}
