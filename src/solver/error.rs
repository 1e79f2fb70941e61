use thiserror::Error;

use crate::week::models::PigeonId;

/// Most open games rule extraction will enumerate.
pub const MAX_RULE_GAMES: usize = 3;
/// Most open games the outcome grid will lay out.
pub const MAX_GRID_GAMES: usize = 2;

/// Reasons the solver declines to produce a result.
///
/// "Not achievable" is a computed answer and never an error; these variants
/// mean nothing was computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("pigeon {0} is not on the roster")]
    SubjectNotFound(PigeonId),

    #[error("{open} open games is too many to explain (limit {limit})")]
    TooManyOpenGames { open: usize, limit: usize },
}
