use std::sync::Arc;

use matchday_domain::{
    matches::{ArcCampaignRepository, ArcMatchRepository},
    roster::{ArcPlayerRepository, ArcTeamRepository},
    stats::{ArcStatsRepository, ArcStatsService, StatsServiceImpl},
    user::{ArcUserRepository, ArcUserService, UserServiceImpl},
};
use matchday_persistence_sqlite::{
    matches::{SqliteCampaignRepository, SqliteMatchRepository},
    rosters::{SqlitePlayerRepository, SqliteTeamRepository},
    stats::SqliteStatsRepository,
    users::SqliteUserRepository,
};
use sqlx::{Pool, Sqlite};

#[derive(Clone)]
pub struct AppState {
    pub user_service: ArcUserService,
    pub stats_service: ArcStatsService,

    pub user_repository: ArcUserRepository,
    pub team_repository: ArcTeamRepository,
    pub player_repository: ArcPlayerRepository,
    pub campaign_repository: ArcCampaignRepository,
    pub match_repository: ArcMatchRepository,
    pub stats_repository: ArcStatsRepository,
}

pub fn build_app(pool: Pool<Sqlite>) -> AppState {
    let user_repository: ArcUserRepository =
        Arc::new(Box::new(SqliteUserRepository::new(pool.clone())));
    let team_repository: ArcTeamRepository =
        Arc::new(Box::new(SqliteTeamRepository::new(pool.clone())));
    let player_repository: ArcPlayerRepository =
        Arc::new(Box::new(SqlitePlayerRepository::new(pool.clone())));
    let campaign_repository: ArcCampaignRepository =
        Arc::new(Box::new(SqliteCampaignRepository::new(pool.clone())));
    let match_repository: ArcMatchRepository =
        Arc::new(Box::new(SqliteMatchRepository::new(pool.clone())));
    let stats_repository: ArcStatsRepository =
        Arc::new(Box::new(SqliteStatsRepository::new(pool)));

    let user_service: ArcUserService =
        Arc::new(Box::new(UserServiceImpl::new(user_repository.clone())));
    let stats_service: ArcStatsService = Arc::new(Box::new(StatsServiceImpl::new(
        team_repository.clone(),
        player_repository.clone(),
        campaign_repository.clone(),
        match_repository.clone(),
        stats_repository.clone(),
    )));

    AppState {
        user_service,
        stats_service,
        user_repository,
        team_repository,
        player_repository,
        campaign_repository,
        match_repository,
        stats_repository,
    }
}
