use anyhow::Result;
use async_trait::async_trait;

use super::models::WeekSnapshot;

/// Source of validated week data for the solver.
#[async_trait]
pub trait WeekProvider: Send + Sync {
    /// Fetch games, picks and standings for one week.
    async fn fetch_week(&self, week: u8) -> Result<WeekSnapshot>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
