//! Plain-text rendering for the command line.

use std::collections::HashMap;
use std::fmt::Write;

use super::explain::Explanation;
use super::grid::{GridAxis, OutcomeGrid};
use super::rules::margin_label;
use crate::week::models::{MarginDomain, PigeonId, WeekSnapshot};

fn names(snapshot: &WeekSnapshot) -> HashMap<PigeonId, &str> {
    snapshot
        .standings
        .iter()
        .map(|s| (s.pigeon, s.name.as_str()))
        .collect()
}

fn axis_labels(axis: &GridAxis, domain: MarginDomain) -> Vec<String> {
    axis.intervals
        .iter()
        .map(|iv| margin_label(&axis.home, &axis.away, iv.lo, iv.hi, domain))
        .collect()
}

pub fn render_explanation(ex: &Explanation, top_k: usize) -> String {
    let mut out = String::new();
    match (ex.achievable, ex.best_rank) {
        (true, Some(rank)) => {
            let how = if ex.tie == Some(true) { "tied" } else { "outright" };
            let _ = writeln!(
                out,
                "{} ({}): best finish {} ({}) across {} scenario(s)",
                ex.name, ex.pigeon, rank, how, ex.scenarios
            );
        }
        (_, best) => {
            let _ = writeln!(
                out,
                "{} ({}): no top-{} finish possible (best {})",
                ex.name,
                ex.pigeon,
                top_k,
                best.map_or_else(|| "-".to_string(), |r| r.to_string())
            );
        }
    }
    for pill in &ex.rules {
        let _ = writeln!(out, "  [{}] {}", pill.target, pill.label);
    }
    let reach: Vec<String> = ex
        .placements
        .iter()
        .map(|p| format!("{} x{}", p.placement, p.scenarios))
        .collect();
    let _ = writeln!(out, "  reachable: {}", reach.join(", "));
    out
}

pub fn render_grid(grid: &OutcomeGrid, snapshot: &WeekSnapshot, domain: MarginDomain) -> String {
    let names = names(snapshot);
    let who = |ids: &[PigeonId]| -> String {
        ids.iter()
            .map(|id| names.get(id).copied().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join("/")
    };

    let mut out = String::new();
    match grid.axes.as_slice() {
        [] => {
            if let Some(cell) = grid.cells.first() {
                let _ = writeln!(out, "No open games. Winner(s): {}", who(cell.winners.as_slice()));
            }
        }
        [axis] => {
            let labels = axis_labels(axis, domain);
            let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            let _ = writeln!(out, "{} @ {}", axis.away, axis.home);
            for (i, label) in labels.iter().enumerate() {
                if let Some(cell) = grid.cell(&[i]) {
                    let _ = writeln!(out, "  {:<width$}  {}", label, who(cell.winners.as_slice()), width = width);
                }
            }
        }
        [rows, cols] => {
            let row_labels = axis_labels(rows, domain);
            let col_labels = axis_labels(cols, domain);
            let _ = writeln!(
                out,
                "rows: {} @ {}, columns: {} @ {}",
                rows.away, rows.home, cols.away, cols.home
            );
            for (r, row_label) in row_labels.iter().enumerate() {
                let _ = writeln!(out, "  {}", row_label);
                for (c, col_label) in col_labels.iter().enumerate() {
                    if let Some(cell) = grid.cell(&[r, c]) {
                        let _ = writeln!(out, "    {}: {}", col_label, who(cell.winners.as_slice()));
                    }
                }
            }
        }
        _ => {}
    }

    if !grid.best_finish_for_non_leaders.is_empty() {
        let _ = writeln!(out, "Best finish for non-leaders:");
        for b in &grid.best_finish_for_non_leaders {
            let how = if b.tied { " (tied)" } else { "" };
            let _ = writeln!(out, "  {}: {}{}", b.name, b.best_rank, how);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::testutil::{game, snapshot};
    use crate::solver::{explain_best_placement, grid_for_open_games, SolverOptions};
    use crate::week::models::GameStatus;

    #[test]
    fn test_render_single_game_grid() {
        let snap = snapshot(
            &[("Ann", 0), ("Bo", 0)],
            vec![game(1, GameStatus::Scheduled, None)],
            &[(0, 1, Some(3)), (1, 1, Some(-3))],
        );
        let opts = SolverOptions::default();
        let grid = grid_for_open_games(&snap, &opts).unwrap();
        let text = render_grid(&grid, &snap, opts.domain);
        assert!(text.starts_with("A1 @ H1"));
        assert!(text.contains("H1 by 3  "));
        assert!(text.contains("Ann"));
        assert!(text.contains("Bo"));
    }

    #[test]
    fn test_render_explanation_lists_pills() {
        let snap = snapshot(
            &[("Ann", 10), ("Bo", 12)],
            vec![game(1, GameStatus::Scheduled, None)],
            &[(0, 1, Some(3)), (1, 1, Some(-3))],
        );
        let opts = SolverOptions::default();
        let ex = explain_best_placement(&snap, PigeonId(2), &opts).unwrap();
        let text = render_explanation(&ex, opts.top_k);
        assert!(text.starts_with("Bo (#2): best finish 1 (outright)"));
        assert!(text.contains("[1] A1 wins"));
        assert!(text.contains("reachable: 1 x"));
    }
}
