//! Outcome feasibility and rule extraction.
//!
//! Pipeline: picks are scored per open game, each game's margin domain is
//! cut into intervals on which the score order is fixed, the cross product of
//! intervals is enumerated and ranked, and the cells matching a placement are
//! tiled into boxes that read as rules.

pub mod error;
pub mod explain;
pub mod grid;
pub mod intervals;
pub mod ranking;
pub mod render;
pub mod rules;
pub mod scenarios;
pub mod scoring;
pub mod tiling;

#[cfg(test)]
pub(crate) mod testutil;

use serde::{Deserialize, Serialize};

use crate::week::models::{LivePolicy, MarginDomain};

pub use error::{SolverError, MAX_GRID_GAMES, MAX_RULE_GAMES};
pub use explain::{explain_best_placement, explain_placement, Explanation};
pub use grid::{grid_for_open_games, OutcomeGrid};
pub use ranking::Placement;
pub use rules::RulePill;
pub use scoring::ScoringRules;

/// How many placements count as "winning" for the explain view.
pub const DEFAULT_TOP_K: usize = 5;
/// How many rule pills the explain view returns by default.
pub const DEFAULT_MAX_PILLS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOptions {
    pub domain: MarginDomain,
    pub rules: ScoringRules,
    pub top_k: usize,
    /// `None` returns every pill
    pub max_pills: Option<usize>,
    pub live_policy: LivePolicy,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            domain: MarginDomain::default(),
            rules: ScoringRules::default(),
            top_k: DEFAULT_TOP_K,
            max_pills: Some(DEFAULT_MAX_PILLS),
            live_policy: LivePolicy::default(),
        }
    }
}
