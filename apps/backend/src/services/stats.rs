use serde::Serialize;

use crate::domain::state::GameStatus;
use crate::error::AppError;
use crate::repos::agents::{self, Agent};
use crate::repos::games;
use crate::services::views::{self, GameSummary};
use crate::state::app_state::AppState;

/// Upper bound for each dashboard section.
pub const DASHBOARD_LIMIT_MAX: u64 = 20;
pub const LIVE_LIMIT_DEFAULT: u64 = 6;
pub const HISTORY_LIMIT_DEFAULT: u64 = 8;
pub const RANKING_LIMIT_DEFAULT: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub agents: u64,
    pub games: u64,
    pub live_games: u64,
}

/// Section sizes for [`dashboard`]; zero or absent means the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardLimits {
    pub live: Option<u64>,
    pub history: Option<u64>,
    pub ranking: Option<u64>,
}

impl DashboardLimits {
    fn clamp(raw: Option<u64>, default: u64) -> u64 {
        raw.filter(|&n| n > 0)
            .unwrap_or(default)
            .min(DASHBOARD_LIMIT_MAX)
    }

    pub fn live(&self) -> u64 {
        Self::clamp(self.live, LIVE_LIMIT_DEFAULT)
    }

    pub fn history(&self) -> u64 {
        Self::clamp(self.history, HISTORY_LIMIT_DEFAULT)
    }

    pub fn ranking(&self) -> u64 {
        Self::clamp(self.ranking, RANKING_LIMIT_DEFAULT)
    }
}

/// Everything the spectator landing page shows in one response.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: Overview,
    pub rankings: Vec<Agent>,
    pub live_games: Vec<GameSummary>,
    pub recent_games: Vec<GameSummary>,
}

pub async fn overview(state: &AppState) -> Result<Overview, AppError> {
    Ok(Overview {
        agents: agents::count_active(&state.db).await?,
        games: games::count(&state.db, None).await?,
        live_games: games::count(&state.db, Some(GameStatus::Active)).await?,
    })
}

pub async fn dashboard(state: &AppState, limits: DashboardLimits) -> Result<Dashboard, AppError> {
    // Resolve due timeouts before counting so the numbers agree with the lists.
    let mut live_games =
        views::list_games(state, Some(GameStatus::Active), limits.live()).await?;
    live_games.retain(|game| game.status == GameStatus::Active);
    let recent_games =
        views::list_games(state, Some(GameStatus::Finished), limits.history()).await?;
    Ok(Dashboard {
        stats: overview(state).await?,
        rankings: agents::rankings(&state.db, limits.ranking()).await?,
        live_games,
        recent_games,
    })
}
