use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

use crate::solver::{ScoringRules, SolverOptions, DEFAULT_MAX_PILLS, DEFAULT_TOP_K};
use crate::solver::scoring::WRONG_SIDE_PENALTY;
use crate::week::models::{LivePolicy, MarginDomain, MAX_MARGIN};

/// Outcome feasibility and rule extraction for the weekly pigeon pool
#[derive(Parser, Debug, Clone)]
#[command(name = "pigeon-pool", version, about)]
pub struct Config {
    /// Directory holding week-<N>.json snapshot documents
    #[arg(long, env = "POOL_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Pool backend base URL (serves /results/weeks/{week}/...)
    #[arg(long, env = "POOL_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the pool backend
    #[arg(long, env = "POOL_API_TOKEN")]
    pub api_token: Option<String>,

    /// How long a fetched week stays cached (0 disables the cache)
    #[arg(long, env = "POOL_CACHE_TTL_SECS", default_value = "30")]
    pub cache_ttl_secs: u64,

    /// Lowest signed margin (home minus away) to enumerate
    #[arg(long, env = "POOL_MARGIN_MIN", default_value = "-40", allow_hyphen_values = true)]
    pub margin_min: i32,

    /// Highest signed margin to enumerate
    #[arg(long, env = "POOL_MARGIN_MAX", default_value = "40")]
    pub margin_max: i32,

    /// Flat penalty for picking the wrong side
    #[arg(long, env = "POOL_WRONG_SIDE_PENALTY", default_value_t = WRONG_SIDE_PENALTY, allow_hyphen_values = true)]
    pub wrong_side_penalty: i32,

    /// Placements counted as a finish worth explaining
    #[arg(long, env = "POOL_TOP_K", default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Rule pills returned per explanation
    #[arg(long, env = "POOL_MAX_PILLS", default_value_t = DEFAULT_MAX_PILLS)]
    pub max_pills: usize,

    /// Whether in-progress games are enumerated or taken as final
    #[arg(long, env = "POOL_LIVE_GAMES", value_enum, default_value = "final")]
    pub live_games: LiveGames,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveGames {
    Open,
    Final,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Best reachable finish for one player and the rules that lead there
    Explain {
        #[arg(long)]
        week: u8,
        /// Pigeon number
        #[arg(long)]
        pigeon: u32,
        /// Explain this rank instead of the best one
        #[arg(long)]
        rank: Option<usize>,
        /// With --rank: the shared version of that rank
        #[arg(long, requires = "rank")]
        tied: bool,
        #[arg(long)]
        json: bool,
    },
    /// Winners for every result of the last one or two open games
    Grid {
        #[arg(long)]
        week: u8,
        #[arg(long)]
        json: bool,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "POOL_ADDR", default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        match (&self.data_dir, &self.api_url) {
            (None, None) => anyhow::bail!(
                "No week source configured. Set POOL_DATA_DIR or POOL_API_URL."
            ),
            (Some(_), Some(_)) => anyhow::bail!(
                "POOL_DATA_DIR and POOL_API_URL are mutually exclusive"
            ),
            _ => {}
        }
        MarginDomain::new(self.margin_min, self.margin_max)?;
        if !(0..=MAX_MARGIN).contains(&self.wrong_side_penalty) {
            anyhow::bail!("wrong_side_penalty must be between 0 and {}", MAX_MARGIN);
        }
        if self.top_k == 0 {
            anyhow::bail!("top_k must be at least 1");
        }
        if self.max_pills == 0 {
            anyhow::bail!("max_pills must be at least 1");
        }
        if self.api_token.is_some() && self.api_url.is_none() {
            anyhow::bail!("POOL_API_TOKEN is only used with POOL_API_URL");
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn solver_options(&self) -> anyhow::Result<SolverOptions> {
        Ok(SolverOptions {
            domain: MarginDomain::new(self.margin_min, self.margin_max)?,
            rules: ScoringRules {
                wrong_side_penalty: self.wrong_side_penalty,
            },
            top_k: self.top_k,
            max_pills: Some(self.max_pills),
            live_policy: match self.live_games {
                LiveGames::Open => LivePolicy::TreatAsOpen,
                LiveGames::Final => LivePolicy::TreatAsFinal,
            },
        })
    }
}
