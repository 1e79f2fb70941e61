//! Human-readable rule pills built from feasibility boxes.

use serde::Serialize;

use super::ranking::Placement;
use super::scenarios::ScenarioSpace;
use super::tiling::Rectangle;
use crate::week::models::{GameId, MarginDomain};

/// One game's condition inside a pill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub game: GameId,
    /// Lowest signed margin (home minus away) satisfying the condition
    pub lo: i32,
    /// Highest signed margin satisfying the condition
    pub hi: i32,
    pub label: String,
}

/// A set of game conditions that together guarantee `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulePill {
    pub target: Placement,
    /// Constrained games only; a game whose whole domain qualifies is omitted.
    pub conditions: Vec<Condition>,
    pub label: String,
    /// Low margin per open game, used for ordering
    #[serde(skip)]
    starts: Vec<i32>,
}

fn side_label(team: &str, a: i32, b: i32, open_ended: bool) -> String {
    if open_ended && a == 1 {
        format!("{} wins", team)
    } else if open_ended {
        format!("{} by ≥ {}", team, a)
    } else if a == b {
        format!("{} by {}", team, a)
    } else if a == 1 {
        format!("{} by ≤ {}", team, b)
    } else {
        format!("{} by {}-{}", team, a, b)
    }
}

/// Describe the signed-margin range `lo..=hi` for one game.
pub fn margin_label(home: &str, away: &str, lo: i32, hi: i32, domain: MarginDomain) -> String {
    if lo <= domain.min && hi >= domain.max {
        return "any result".to_string();
    }

    let mut parts = Vec::with_capacity(3);
    if lo < 0 {
        let a = -hi.min(-1);
        parts.push(side_label(away, a, -lo, lo <= domain.min));
    }
    if lo <= 0 && hi >= 0 {
        parts.push("tie".to_string());
    }
    if hi > 0 {
        parts.push(side_label(home, lo.max(1), hi, hi >= domain.max));
    }
    parts.join(" OR ")
}

/// Turn one box of interval indices into a pill.
pub fn pill_from_rect(
    space: &ScenarioSpace,
    rect: &Rectangle,
    target: Placement,
    domain: MarginDomain,
) -> RulePill {
    let mut conditions = Vec::new();
    let mut starts = Vec::with_capacity(rect.ranges.len());
    for (open, &(first, last)) in space.games().iter().zip(&rect.ranges) {
        let lo = open.intervals[first].lo;
        let hi = open.intervals[last].hi;
        starts.push(lo);
        if lo <= domain.min && hi >= domain.max {
            continue;
        }
        conditions.push(Condition {
            game: open.game.id,
            lo,
            hi,
            label: margin_label(&open.game.home, &open.game.away, lo, hi, domain),
        });
    }

    let label = match conditions.len() {
        0 => "any results".to_string(),
        1 => conditions[0].label.clone(),
        _ => conditions
            .iter()
            .map(|c| {
                if c.label.contains(" OR ") {
                    format!("({})", c.label)
                } else {
                    c.label.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" AND "),
    };

    RulePill {
        target,
        conditions,
        label,
        starts,
    }
}

/// Best target first, then the pill whose ranges start earliest.
pub fn sort_pills(pills: &mut [RulePill]) {
    pills.sort_by(|a, b| a.target.cmp(&b.target).then_with(|| a.starts.cmp(&b.starts)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::testutil::{game, snapshot};
    use crate::solver::SolverOptions;
    use crate::week::models::GameStatus;

    fn d() -> MarginDomain {
        MarginDomain::default()
    }

    #[test]
    fn test_point_labels() {
        assert_eq!(margin_label("KC", "BUF", 3, 3, d()), "KC by 3");
        assert_eq!(margin_label("KC", "BUF", -7, -7, d()), "BUF by 7");
        assert_eq!(margin_label("KC", "BUF", 0, 0, d()), "tie");
    }

    #[test]
    fn test_open_ended_labels() {
        assert_eq!(margin_label("KC", "BUF", 10, 40, d()), "KC by ≥ 10");
        assert_eq!(margin_label("KC", "BUF", -40, -4, d()), "BUF by ≥ 4");
        assert_eq!(margin_label("KC", "BUF", 1, 40, d()), "KC wins");
    }

    #[test]
    fn test_bounded_ranges() {
        assert_eq!(margin_label("KC", "BUF", 1, 6, d()), "KC by ≤ 6");
        assert_eq!(margin_label("KC", "BUF", 4, 9, d()), "KC by 4-9");
        assert_eq!(margin_label("KC", "BUF", -9, -4, d()), "BUF by 4-9");
    }

    #[test]
    fn test_straddling_zero_is_an_or() {
        assert_eq!(
            margin_label("KC", "BUF", -3, 5, d()),
            "BUF by ≤ 3 OR tie OR KC by ≤ 5"
        );
        assert_eq!(margin_label("KC", "BUF", 0, 40, d()), "tie OR KC wins");
        assert_eq!(margin_label("KC", "BUF", -40, 40, d()), "any result");
    }

    #[test]
    fn test_pill_joins_conditions_and_skips_free_games() {
        let snap = snapshot(
            &[("A", 0), ("B", 0)],
            vec![
                game(1, GameStatus::Scheduled, None),
                game(2, GameStatus::Scheduled, None),
            ],
            &[(0, 1, Some(3)), (1, 2, Some(-3))],
        );
        let opts = SolverOptions::default();
        let space = ScenarioSpace::build(&snap, &opts);
        let g0 = &space.games()[0].intervals;
        let first = g0.iter().position(|iv| iv.lo == 3).unwrap();
        let last = g0.len() - 1;
        let all = space.games()[1].intervals.len() - 1;

        let rect = Rectangle { ranges: vec![(first, last), (0, all)] };
        let pill = pill_from_rect(&space, &rect, Placement::new(1, false), opts.domain);
        assert_eq!(pill.conditions.len(), 1);
        assert_eq!(pill.label, "H1 by ≥ 3");

        let zero = space.games()[1].intervals.iter().position(|iv| iv.lo == 0).unwrap();
        let rect = Rectangle { ranges: vec![(first, last), (zero, zero)] };
        let pill = pill_from_rect(&space, &rect, Placement::new(1, false), opts.domain);
        assert_eq!(pill.label, "H1 by ≥ 3 AND tie");
    }

    #[test]
    fn test_sort_pills_by_target_then_start() {
        let mk = |rank, tied, start| RulePill {
            target: Placement::new(rank, tied),
            conditions: vec![],
            label: String::new(),
            starts: vec![start],
        };
        let mut pills = vec![mk(2, false, -5), mk(1, true, -40), mk(1, false, 7), mk(1, false, -2)];
        sort_pills(&mut pills);
        let order: Vec<(usize, bool, i32)> = pills
            .iter()
            .map(|p| (p.target.rank, p.target.tied, p.starts[0]))
            .collect();
        assert_eq!(
            order,
            vec![(1, false, -2), (1, false, 7), (1, true, -40), (2, false, -5)]
        );
    }
}
