use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{ServiceResult, roster::TeamId};

pub type CampaignId = i64;
pub type MatchId = i64;

/// A season or tournament that matches can be grouped under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: MatchId,
    pub date: DateTime<Utc>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub campaign_id: Option<CampaignId>,
}

#[derive(Debug, Clone)]
pub struct NewMatch {
    pub date: DateTime<Utc>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub campaign_id: Option<CampaignId>,
}

/// Aggregate passing numbers for both sides, one row per match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchStats {
    pub match_id: MatchId,
    pub home_passes: i32,
    pub home_passes_completed: i32,
    pub away_passes: i32,
    pub away_passes_completed: i32,
}

pub type ArcCampaignRepository = Arc<Box<dyn CampaignRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait CampaignRepository {
    async fn get_campaign_by_id(&self, id: CampaignId) -> ServiceResult<Option<Campaign>>;
    async fn get_or_create_campaign(&self, name: &str) -> ServiceResult<Campaign>;
}

pub type ArcMatchRepository = Arc<Box<dyn MatchRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait MatchRepository {
    async fn create_match(&self, new_match: &NewMatch) -> ServiceResult<Match>;
    async fn get_match(&self, id: MatchId) -> ServiceResult<Option<Match>>;
    async fn get_matches_for_team(&self, team_id: TeamId) -> ServiceResult<Vec<Match>>;
    /// Remove the match together with every dependent record: its
    /// participation rows, their shots, the goals scored from those shots,
    /// the assists on those goals, and the aggregate stats row. Children are
    /// deleted before parents in a single transaction. Returns whether a
    /// match row was actually removed.
    async fn delete_match(&self, id: MatchId) -> ServiceResult<bool>;
    async fn set_match_stats(&self, stats: &MatchStats) -> ServiceResult<()>;
    async fn get_match_stats(&self, match_id: MatchId) -> ServiceResult<Option<MatchStats>>;
}
