//! Outcome-interval partitioning for a single game.
//!
//! Every player's score for a game is `|p - a| + c` where `c` only changes at
//! the sign boundaries of the actual margin `a`. Two players' scores can only
//! swap order at a prediction, at a sign boundary, or where the two V-shapes
//! cross: `(p + q + d) / 2` for `d` in `{0, +penalty, -penalty}`. Splitting the
//! domain at all of those "kinks" leaves ranges on which the relative order of
//! every pair of scores is fixed, so one representative margin per range is
//! enough to evaluate it.
//!
//! Kinks become singleton intervals of their own because the score is
//! discontinuous at the sign boundaries and pairwise ties live exactly on them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::scoring::ScoringRules;
use crate::week::models::MarginDomain;

/// Closed range of signed margins evaluated through one representative value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub lo: i32,
    pub hi: i32,
    pub rep: i32,
}

impl Interval {
    fn point(v: i32) -> Self {
        Interval { lo: v, hi: v, rep: v }
    }

    fn span(lo: i32, hi: i32) -> Self {
        Interval {
            lo,
            hi,
            rep: lo + (hi - lo) / 2,
        }
    }

    pub fn is_point(&self) -> bool {
        self.lo == self.hi
    }

    pub fn contains(&self, v: i32) -> bool {
        (self.lo..=self.hi).contains(&v)
    }
}

/// Floor and ceiling of `twice / 2`, kept only when inside the domain.
fn push_half(kinks: &mut BTreeSet<i32>, domain: MarginDomain, twice: i64) {
    for k in [twice.div_euclid(2), (twice + 1).div_euclid(2)] {
        if let Ok(k) = i32::try_from(k) {
            if (domain.min..=domain.max).contains(&k) {
                kinks.insert(k);
            }
        }
    }
}

/// Breakpoints for one game: domain bounds, the tie step, every prediction and
/// every pairwise crossing.
pub fn kinks(domain: MarginDomain, predictions: &[Option<i32>], rules: &ScoringRules) -> BTreeSet<i32> {
    // a missing pick behaves like a tie guess away from zero
    let mut values: BTreeSet<i32> = predictions.iter().map(|p| p.unwrap_or(0)).collect();
    values.insert(0);

    let mut kinks: BTreeSet<i32> = [domain.min, domain.max, -1, 0, 1].into_iter().collect();
    kinks.extend(values.iter().map(|&v| domain.clamp(v)));

    let values: Vec<i64> = values.into_iter().map(i64::from).collect();
    let penalty = i64::from(rules.wrong_side_penalty);
    for (i, &p) in values.iter().enumerate() {
        for &q in &values[i + 1..] {
            push_half(&mut kinks, domain, p + q);
            push_half(&mut kinks, domain, p + q + penalty);
            push_half(&mut kinks, domain, p + q - penalty);
        }
    }

    kinks.retain(|k| (domain.min..=domain.max).contains(k));
    kinks
}

/// Split the margin domain into sorted, disjoint intervals covering it exactly.
pub fn partition(domain: MarginDomain, predictions: &[Option<i32>], rules: &ScoringRules) -> Vec<Interval> {
    let kinks: Vec<i32> = kinks(domain, predictions, rules).into_iter().collect();

    let mut out = Vec::with_capacity(kinks.len() * 2);
    for (i, &k) in kinks.iter().enumerate() {
        out.push(Interval::point(k));
        if let Some(&next) = kinks.get(i + 1) {
            if next - k > 1 {
                out.push(Interval::span(k + 1, next - 1));
            }
        }
    }

    debug_assert!(covers_exactly(&out, domain), "intervals must tile the domain");
    out
}

/// True when `intervals` are sorted, gap-free, non-overlapping and span `domain`.
pub fn covers_exactly(intervals: &[Interval], domain: MarginDomain) -> bool {
    let mut expected = i64::from(domain.min);
    for iv in intervals {
        if i64::from(iv.lo) != expected || iv.hi < iv.lo || !iv.contains(iv.rep) {
            return false;
        }
        expected = i64::from(iv.hi) + 1;
    }
    expected == i64::from(domain.max) + 1
}
