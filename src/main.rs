use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use pigeon_pool::config::{Command, Config};
use pigeon_pool::dashboard::{self, AppState};
use pigeon_pool::solver::render::{render_explanation, render_grid};
use pigeon_pool::solver::{
    explain_best_placement, explain_placement, grid_for_open_games, Placement, SolverOptions,
};
use pigeon_pool::week::models::PigeonId;
use pigeon_pool::week::{CachedProvider, FileProvider, RestProvider, WeekProvider};

fn build_provider(config: &Config) -> Result<Arc<dyn WeekProvider>> {
    let ttl = config.cache_ttl();
    let provider: Arc<dyn WeekProvider> = match (&config.data_dir, &config.api_url) {
        (Some(dir), _) => {
            info!("Reading weeks from {}", dir);
            Arc::new(CachedProvider::new(FileProvider::new(dir.clone()), ttl))
        }
        (None, Some(url)) => {
            info!("Fetching weeks from {}", url);
            Arc::new(CachedProvider::new(
                RestProvider::new(url, config.api_token.clone())?,
                ttl,
            ))
        }
        (None, None) => anyhow::bail!("No week source configured"),
    };
    Ok(provider)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

async fn run_explain(
    provider: &dyn WeekProvider,
    opts: &SolverOptions,
    week: u8,
    pigeon: u32,
    target: Option<Placement>,
    json: bool,
) -> Result<()> {
    let snapshot = provider.fetch_week(week).await?;
    let pigeon = PigeonId(pigeon);

    match target {
        Some(target) => {
            let rules = explain_placement(&snapshot, pigeon, target, opts)?;
            if json {
                return print_json(&rules);
            }
            if rules.is_empty() {
                println!("{} is not reachable for {}", target, pigeon);
            }
            for pill in &rules {
                println!("[{}] {}", pill.target, pill.label);
            }
        }
        None => {
            let explanation = explain_best_placement(&snapshot, pigeon, opts)?;
            if json {
                return print_json(&explanation);
            }
            print!("{}", render_explanation(&explanation, opts.top_k));
        }
    }
    Ok(())
}

async fn run_grid(provider: &dyn WeekProvider, opts: &SolverOptions, week: u8, json: bool) -> Result<()> {
    let snapshot = provider.fetch_week(week).await?;
    let grid = grid_for_open_games(&snapshot, opts)?;
    if json {
        return print_json(&grid);
    }
    print!("{}", render_grid(&grid, &snapshot, opts.domain));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;
    let opts = config.solver_options()?;
    let provider = build_provider(&config)?;

    match config.command.clone() {
        Command::Explain {
            week,
            pigeon,
            rank,
            tied,
            json,
        } => {
            let target = rank.map(|r| Placement::new(r, tied));
            run_explain(provider.as_ref(), &opts, week, pigeon, target, json).await?;
        }
        Command::Grid { week, json } => {
            run_grid(provider.as_ref(), &opts, week, json).await?;
        }
        Command::Serve { addr } => {
            let app = dashboard::router(AppState {
                provider,
                options: opts,
            });
            let addr: SocketAddr = addr.parse().context("Invalid listen address")?;
            info!("API listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
