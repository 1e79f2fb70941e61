//! Feasibility masks and their greedy decomposition into axis-aligned boxes.
//!
//! The tiler scans cells row-major. Each uncovered member cell seeds a box
//! that grows along the innermost axis first, then outward, for as long as
//! the whole slab it would add is made of uncovered member cells. The result
//! is an exact, non-overlapping cover, but not necessarily the smallest one.

use serde::{Deserialize, Serialize};

use super::error::{SolverError, MAX_RULE_GAMES};

/// Boolean array over interval-index coordinates, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeasibilityMask {
    dims: Vec<usize>,
    cells: Vec<bool>,
}

impl FeasibilityMask {
    pub fn from_cells(dims: &[usize], cells: Vec<bool>) -> Self {
        debug_assert_eq!(cells.len(), dims.iter().product::<usize>());
        FeasibilityMask {
            dims: dims.to_vec(),
            cells,
        }
    }

    pub fn from_fn(dims: &[usize], f: impl Fn(usize) -> bool) -> Self {
        let len = dims.iter().product();
        Self::from_cells(dims, (0..len).map(f).collect())
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn flat(&self, coords: &[usize]) -> usize {
        coords
            .iter()
            .zip(&self.dims)
            .fold(0, |acc, (&c, &d)| acc * d + c)
    }

    pub fn get(&self, coords: &[usize]) -> bool {
        self.cells[self.flat(coords)]
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Cover the true cells with boxes.
    pub fn tile(&self) -> Result<Vec<Rectangle>, SolverError> {
        tile(&self.dims, |coords| self.get(coords))
    }
}

/// Inclusive range of interval indices per axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub ranges: Vec<(usize, usize)>,
}

impl Rectangle {
    pub fn contains(&self, coords: &[usize]) -> bool {
        coords
            .iter()
            .zip(&self.ranges)
            .all(|(&c, &(lo, hi))| lo <= c && c <= hi)
    }

    pub fn cell_count(&self) -> usize {
        self.ranges.iter().map(|(lo, hi)| hi - lo + 1).product()
    }

    /// Visit every cell; stops early and returns false once `f` does.
    pub fn all_cells(&self, f: impl FnMut(&[usize]) -> bool) -> bool {
        let lo: Vec<usize> = self.ranges.iter().map(|r| r.0).collect();
        let hi: Vec<usize> = self.ranges.iter().map(|r| r.1).collect();
        all_in_box(&lo, &hi, f)
    }
}

/// Odometer walk over `lo..=hi`, innermost axis fastest.
fn all_in_box(lo: &[usize], hi: &[usize], mut f: impl FnMut(&[usize]) -> bool) -> bool {
    let mut cur = lo.to_vec();
    loop {
        if !f(&cur) {
            return false;
        }
        let mut axis = cur.len();
        loop {
            if axis == 0 {
                return true;
            }
            axis -= 1;
            if cur[axis] < hi[axis] {
                cur[axis] += 1;
                break;
            }
            cur[axis] = lo[axis];
        }
    }
}

/// Greedy box cover of the cells of `dims` for which `member` holds.
///
/// Only 1 to 3 axes are supported (zero axes yields a single empty box when
/// the lone cell is a member).
pub fn tile(dims: &[usize], member: impl Fn(&[usize]) -> bool) -> Result<Vec<Rectangle>, SolverError> {
    if dims.len() > MAX_RULE_GAMES {
        return Err(SolverError::TooManyOpenGames {
            open: dims.len(),
            limit: MAX_RULE_GAMES,
        });
    }

    let len: usize = dims.iter().product();
    let mut covered = vec![false; len];
    let flat = |coords: &[usize]| {
        coords
            .iter()
            .zip(dims)
            .fold(0usize, |acc, (&c, &d)| acc * d + c)
    };

    let mut rects = Vec::new();
    let mut coords = vec![0usize; dims.len()];
    for start in 0..len {
        let mut rem = start;
        for (axis, &d) in dims.iter().enumerate().rev() {
            coords[axis] = rem % d;
            rem /= d;
        }
        if covered[start] || !member(&coords) {
            continue;
        }

        let lo = coords.clone();
        let mut hi = coords.clone();
        for axis in (0..dims.len()).rev() {
            while hi[axis] + 1 < dims[axis] {
                let mut slab_lo = lo.clone();
                let mut slab_hi = hi.clone();
                slab_lo[axis] = hi[axis] + 1;
                slab_hi[axis] = hi[axis] + 1;
                let free = all_in_box(&slab_lo, &slab_hi, |c| !covered[flat(c)] && member(c));
                if !free {
                    break;
                }
                hi[axis] += 1;
            }
        }

        all_in_box(&lo, &hi, |c| {
            covered[flat(c)] = true;
            true
        });
        rects.push(Rectangle {
            ranges: lo.into_iter().zip(hi).collect(),
        });
    }

    Ok(rects)
}
