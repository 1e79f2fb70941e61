//! Tie-aware competition ranking ("1224" ranking) over weekly totals.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A finishing position: competition rank plus whether it is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub rank: usize,
    pub tied: bool,
}

impl Placement {
    pub fn new(rank: usize, tied: bool) -> Self {
        Placement { rank, tied }
    }
}

impl Ord for Placement {
    /// Better placements sort first: lower rank, then an outright finish
    /// before a shared one.
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.tied.cmp(&other.tied))
    }
}

impl PartialOrd for Placement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tied {
            write!(f, "T-{}", self.rank)
        } else {
            write!(f, "{}", self.rank)
        }
    }
}

/// Placement of `totals[subject]`: rank is one plus the number of strictly
/// lower totals, tied when anyone else has the same total.
pub fn placement_of(totals: &[i32], subject: usize) -> Placement {
    let mine = totals[subject];
    let mut better = 0;
    let mut same = 0;
    for &t in totals {
        if t < mine {
            better += 1;
        } else if t == mine {
            same += 1;
        }
    }
    Placement::new(better + 1, same >= 2)
}

/// Placements of every entry, in input order.
pub fn placements(totals: &[i32]) -> Vec<Placement> {
    let mut sorted = totals.to_vec();
    sorted.sort_unstable();
    totals
        .iter()
        .map(|t| {
            let better = sorted.partition_point(|s| s < t);
            let same = sorted.partition_point(|s| s <= t) - better;
            Placement::new(better + 1, same >= 2)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn ranks(totals: &[i32]) -> Vec<usize> {
        placements(totals).iter().map(|p| p.rank).collect()
    }

    #[test]
    fn test_shared_lead() {
        assert_eq!(ranks(&[10, 10, 20]), vec![1, 1, 3]);
        assert!(placement_of(&[10, 10, 20], 0).tied);
        assert!(!placement_of(&[10, 10, 20], 2).tied);
    }

    #[test]
    fn test_shared_second() {
        assert_eq!(ranks(&[5, 6, 6, 9]), vec![1, 2, 2, 4]);
        assert_eq!(placement_of(&[5, 6, 6, 9], 2), Placement::new(2, true));
        assert_eq!(placement_of(&[5, 6, 6, 9], 3), Placement::new(4, false));
    }

    #[test]
    fn test_single_player_is_outright_first() {
        assert_eq!(placement_of(&[42], 0), Placement::new(1, false));
    }

    #[test]
    fn test_placement_order_prefers_outright() {
        let mut v = vec![
            Placement::new(2, false),
            Placement::new(1, true),
            Placement::new(1, false),
        ];
        v.sort();
        assert_eq!(v[0], Placement::new(1, false));
        assert_eq!(v[1], Placement::new(1, true));
    }

    #[test]
    fn test_ranks_independent_of_input_order() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let n = rng.gen_range(1..15);
            let totals: Vec<i32> = (0..n).map(|_| rng.gen_range(0..30)).collect();
            let before = placements(&totals);

            let mut order: Vec<usize> = (0..n).collect();
            order.shuffle(&mut rng);
            let permuted: Vec<i32> = order.iter().map(|&i| totals[i]).collect();
            let after = placements(&permuted);

            for (pos, &orig) in order.iter().enumerate() {
                assert_eq!(after[pos], before[orig]);
                assert_eq!(placement_of(&permuted, pos), before[orig]);
            }
        }
    }
}
