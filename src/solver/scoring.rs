//! Per-pick scoring.
//!
//! A pick costs the distance between the predicted and the actual margin.
//! Landing on a different side of zero than the result (wrong winner, a
//! non-zero pick on a tie, or a tie pick on a decisive game) adds a flat
//! penalty. A missing pick is scored as a tie guess that always pays it.

use serde::{Deserialize, Serialize};

/// Flat penalty for calling the wrong side.
pub const WRONG_SIDE_PENALTY: i32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub wrong_side_penalty: i32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringRules {
            wrong_side_penalty: WRONG_SIDE_PENALTY,
        }
    }
}

impl ScoringRules {
    /// Score one pick against an actual signed margin. Lower is better.
    pub fn score(&self, predicted: Option<i32>, actual: i32) -> i32 {
        match predicted {
            Some(p) => {
                let miss = p.saturating_sub(actual).saturating_abs();
                if p.signum() != actual.signum() {
                    miss.saturating_add(self.wrong_side_penalty)
                } else {
                    miss
                }
            }
            None => actual.saturating_abs().saturating_add(self.wrong_side_penalty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pick_scores_zero() {
        let rules = ScoringRules::default();
        assert_eq!(rules.score(Some(7), 7), 0);
        assert_eq!(rules.score(Some(-3), -3), 0);
        assert_eq!(rules.score(Some(0), 0), 0);
    }

    #[test]
    fn test_right_side_pays_distance_only() {
        let rules = ScoringRules::default();
        assert_eq!(rules.score(Some(3), 10), 7);
        assert_eq!(rules.score(Some(-14), -3), 11);
    }

    #[test]
    fn test_wrong_side_adds_penalty() {
        let rules = ScoringRules::default();
        // home by 3 picked, away won by 4
        assert_eq!(rules.score(Some(3), -4), 7 + 7);
    }

    #[test]
    fn test_tie_result_penalises_non_zero_pick() {
        let rules = ScoringRules::default();
        assert_eq!(rules.score(Some(2), 0), 2 + 7);
        assert_eq!(rules.score(Some(0), 5), 5 + 7);
    }

    #[test]
    fn test_no_pick_is_worst_plausible_guess() {
        let rules = ScoringRules::default();
        assert_eq!(rules.score(None, 0), 7);
        assert_eq!(rules.score(None, -10), 17);
        // never better than a tie pick
        for actual in -40..=40 {
            assert!(rules.score(None, actual) >= rules.score(Some(0), actual));
        }
    }

    #[test]
    fn test_penalty_is_configurable() {
        let rules = ScoringRules { wrong_side_penalty: 100 };
        assert_eq!(rules.score(Some(1), -1), 102);
    }

    #[test]
    fn test_extreme_margins_saturate() {
        let rules = ScoringRules::default();
        assert_eq!(rules.score(Some(i32::MAX), -40), i32::MAX);
        assert_eq!(rules.score(Some(i32::MIN), 40), i32::MAX);
        assert_eq!(rules.score(None, i32::MIN), i32::MAX);
    }
}
