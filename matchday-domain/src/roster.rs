use std::sync::Arc;

use crate::ServiceResult;

pub type TeamId = i64;
pub type PlayerId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub number: i32,
    /// Free agents have no team.
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub name: String,
    pub number: i32,
    pub team_id: Option<TeamId>,
}

pub type ArcTeamRepository = Arc<Box<dyn TeamRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait TeamRepository {
    async fn create_team(&self, name: &str) -> ServiceResult<Team>;
    async fn get_team_by_id(&self, id: TeamId) -> ServiceResult<Option<Team>>;
    async fn get_team_by_name(&self, name: &str) -> ServiceResult<Option<Team>>;
    /// Look up a team by name, inserting it first if absent. Not guaranteed
    /// race-free against concurrent callers creating the same name.
    async fn get_or_create_team(&self, name: &str) -> ServiceResult<Team>;
    async fn get_teams(&self) -> ServiceResult<Vec<Team>>;
}

pub type ArcPlayerRepository = Arc<Box<dyn PlayerRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn create_player(&self, player: &NewPlayer) -> ServiceResult<Player>;
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>>;
    /// Keyed on (name, squad number); the team association is only applied
    /// when the player is first created.
    async fn get_or_create_player(
        &self,
        name: &str,
        number: i32,
        team_id: Option<TeamId>,
    ) -> ServiceResult<Player>;
    async fn get_players_for_team(&self, team_id: TeamId) -> ServiceResult<Vec<Player>>;
    async fn assign_team(&self, id: PlayerId, team_id: Option<TeamId>) -> ServiceResult<()>;
}
