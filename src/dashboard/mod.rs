use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::solver::{
    explain_best_placement, explain_placement, grid_for_open_games, Placement, RulePill,
    SolverError, SolverOptions,
};
use crate::week::models::{PigeonId, WeekSnapshot};
use crate::week::parse::{FIRST_WEEK, LAST_WEEK};
use crate::week::WeekProvider;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn WeekProvider>,
    pub options: SolverOptions,
}

/// Build the Axum router for the JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/weeks/:week/explain/:pigeon", get(explain_handler))
        .route("/api/weeks/:week/grid", get(grid_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExplainQuery {
    /// Explain this placement instead of the best one
    pub rank: Option<usize>,
    #[serde(default)]
    pub tied: bool,
}

#[derive(Debug, Serialize)]
struct TargetRules {
    pigeon: PigeonId,
    target: Placement,
    rules: Vec<RulePill>,
}

fn solver_error(err: SolverError) -> Response {
    match err {
        SolverError::SubjectNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
        SolverError::TooManyOpenGames { open, limit } => (
            StatusCode::CONFLICT,
            Json(json!({
                "refused": "too_many_open_games",
                "open": open,
                "limit": limit,
            })),
        )
            .into_response(),
    }
}

async fn load_week(state: &AppState, week: u8) -> Result<WeekSnapshot, Response> {
    if !(FIRST_WEEK..=LAST_WEEK).contains(&week) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("week {} is outside {}..={}", week, FIRST_WEEK, LAST_WEEK),
        )
            .into_response());
    }
    state.provider.fetch_week(week).await.map_err(|e| {
        warn!("{} failed to load week {}: {:#}", state.provider.name(), week, e);
        (StatusCode::BAD_GATEWAY, format!("{:#}", e)).into_response()
    })
}

/// GET /api/weeks/:week/explain/:pigeon?rank=2&tied=false
async fn explain_handler(
    State(state): State<Arc<AppState>>,
    Path((week, pigeon)): Path<(u8, u32)>,
    Query(query): Query<ExplainQuery>,
) -> Result<Response, Response> {
    let snapshot = load_week(&state, week).await?;
    let pigeon = PigeonId(pigeon);
    match query.rank {
        Some(rank) => {
            let target = Placement::new(rank, query.tied);
            explain_placement(&snapshot, pigeon, target, &state.options)
                .map(|rules| Json(TargetRules { pigeon, target, rules }).into_response())
                .map_err(solver_error)
        }
        None => explain_best_placement(&snapshot, pigeon, &state.options)
            .map(|ex| Json(ex).into_response())
            .map_err(solver_error),
    }
}

/// GET /api/weeks/:week/grid
async fn grid_handler(
    State(state): State<Arc<AppState>>,
    Path(week): Path<u8>,
) -> Result<Response, Response> {
    let snapshot = load_week(&state, week).await?;
    grid_for_open_games(&snapshot, &state.options)
        .map(|grid| Json(grid).into_response())
        .map_err(solver_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    use crate::solver::testutil::{game, snapshot};
    use crate::week::models::GameStatus;

    struct Fixed(WeekSnapshot);

    #[async_trait]
    impl WeekProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_week(&self, week: u8) -> Result<WeekSnapshot> {
            if week != self.0.week {
                anyhow::bail!("week {} not available", week);
            }
            Ok(self.0.clone())
        }
    }

    fn state(open_games: u32) -> Arc<AppState> {
        let snap = snapshot(
            &[("Ann", 10), ("Bo", 12)],
            (1..=open_games).map(|id| game(id, GameStatus::Scheduled, None)).collect(),
            &[(0, 1, Some(3)), (1, 1, Some(-3))],
        );
        Arc::new(AppState {
            provider: Arc::new(Fixed(snap)),
            options: SolverOptions::default(),
        })
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn unwrap_either(r: Result<Response, Response>) -> Response {
        match r {
            Ok(resp) | Err(resp) => resp,
        }
    }

    #[tokio::test]
    async fn test_explain_best_placement() {
        let resp = unwrap_either(
            explain_handler(State(state(1)), Path((7, 2)), Query(ExplainQuery::default())).await,
        );
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["name"], "Bo");
        assert_eq!(body["best_rank"], 1);
        assert_eq!(body["achievable"], true);
    }

    #[tokio::test]
    async fn test_explain_chosen_placement() {
        let query = ExplainQuery { rank: Some(2), tied: false };
        let resp = unwrap_either(explain_handler(State(state(1)), Path((7, 2)), Query(query)).await);
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["target"]["rank"], 2);
        assert!(!body["rules"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_pigeon_is_not_found() {
        let resp = unwrap_either(
            explain_handler(State(state(1)), Path((7, 99)), Query(ExplainQuery::default())).await,
        );
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_grid_refusal_body() {
        let resp = unwrap_either(grid_handler(State(state(3)), Path(7)).await);
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body = body_json(resp).await;
        assert_eq!(body, json!({ "refused": "too_many_open_games", "open": 3, "limit": 2 }));
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let resp = unwrap_either(grid_handler(State(state(1)), Path(8)).await);
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_week_outside_season_is_bad_request() {
        for week in [0, 19] {
            let resp = unwrap_either(grid_handler(State(state(1)), Path(week)).await);
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let resp = unwrap_either(
                explain_handler(State(state(1)), Path((week, 1)), Query(ExplainQuery::default())).await,
            );
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_router_builds() {
        let state = state(1);
        let _ = router(AppState {
            provider: state.provider.clone(),
            options: state.options,
        });
    }
}
