use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;

use crate::{
    ServiceError, ServiceResult,
    matches::{
        ArcCampaignRepository, ArcMatchRepository, CampaignRepository, Match, MatchId,
        MatchRepository, MatchStats, NewMatch,
    },
    roster::{
        ArcPlayerRepository, ArcTeamRepository, PlayerId, PlayerRepository, TeamId, TeamRepository,
    },
};

pub type PlayerMatchId = i64;
pub type ShotId = i64;
pub type GoalId = i64;
pub type AssistId = i64;

/// One player's participation in one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMatch {
    pub id: PlayerMatchId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub match_id: MatchId,
    pub started: bool,
    pub minutes: i32,
    pub subbed_due_to_injury: bool,
    pub yellow_cards: i32,
    pub red_cards: i32,
}

#[derive(Debug, Clone)]
pub struct NewPlayerMatch {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub match_id: MatchId,
    pub started: bool,
    pub minutes: i32,
    pub subbed_due_to_injury: bool,
    pub yellow_cards: i32,
    pub red_cards: i32,
}

impl NewPlayerMatch {
    /// An appearance with no cards and no injury substitution.
    pub fn new(
        player_id: PlayerId,
        team_id: TeamId,
        match_id: MatchId,
        started: bool,
        minutes: i32,
    ) -> Self {
        Self {
            player_id,
            team_id,
            match_id,
            started,
            minutes,
            subbed_due_to_injury: false,
            yellow_cards: 0,
            red_cards: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shot {
    pub id: ShotId,
    pub player_match_id: PlayerMatchId,
    pub x: i32,
    pub y: i32,
    pub on_goal: bool,
}

#[derive(Debug, Clone)]
pub struct NewShot {
    pub player_match_id: PlayerMatchId,
    pub x: i32,
    pub y: i32,
    pub on_goal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    pub id: GoalId,
    pub player_match_id: PlayerMatchId,
    pub shot_id: ShotId,
    pub minute: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub player_match_id: PlayerMatchId,
    pub shot_id: ShotId,
    pub minute: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assist {
    pub id: AssistId,
    pub player_match_id: PlayerMatchId,
    pub goal_id: GoalId,
}

#[derive(Debug, Clone)]
pub struct NewAssist {
    pub player_match_id: PlayerMatchId,
    pub goal_id: GoalId,
}

pub type ArcStatsRepository = Arc<Box<dyn StatsRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait StatsRepository {
    async fn create_player_match(&self, pm: &NewPlayerMatch) -> ServiceResult<PlayerMatch>;
    async fn get_player_match(&self, id: PlayerMatchId) -> ServiceResult<Option<PlayerMatch>>;
    async fn get_player_matches_for_match(
        &self,
        match_id: MatchId,
    ) -> ServiceResult<Vec<PlayerMatch>>;
    /// Removes the participation row and everything hanging off it (shots,
    /// goals scored from those shots or by this player, assists on those
    /// goals or given by this player).
    async fn delete_player_match(&self, id: PlayerMatchId) -> ServiceResult<bool>;

    async fn create_shot(&self, shot: &NewShot) -> ServiceResult<Shot>;
    async fn get_shot(&self, id: ShotId) -> ServiceResult<Option<Shot>>;
    async fn get_shots_for_player_match(
        &self,
        player_match_id: PlayerMatchId,
    ) -> ServiceResult<Vec<Shot>>;
    /// Removes the shot, the goal it produced (if any) and that goal's
    /// assists.
    async fn delete_shot(&self, id: ShotId) -> ServiceResult<bool>;

    async fn create_goal(&self, goal: &NewGoal) -> ServiceResult<Goal>;
    async fn get_goal(&self, id: GoalId) -> ServiceResult<Option<Goal>>;
    async fn get_goals_for_match(&self, match_id: MatchId) -> ServiceResult<Vec<Goal>>;

    async fn create_assist(&self, assist: &NewAssist) -> ServiceResult<Assist>;
    async fn get_assists_for_goal(&self, goal_id: GoalId) -> ServiceResult<Vec<Assist>>;
    async fn get_assists_for_match(&self, match_id: MatchId) -> ServiceResult<Vec<Assist>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

/// A goal as reported on a paper match sheet, attached to the shot that
/// produced it.
#[derive(Debug, Clone)]
pub struct SheetGoal {
    pub minute: Option<i32>,
    /// Side and squad number of the assisting player, if any.
    pub assist_by: Option<(Side, i32)>,
}

#[derive(Debug, Clone)]
pub struct SheetShot {
    pub x: i32,
    pub y: i32,
    pub on_goal: bool,
    pub goal: Option<SheetGoal>,
}

#[derive(Debug, Clone)]
pub struct SheetAppearance {
    pub player_name: String,
    pub player_number: i32,
    pub side: Side,
    pub started: bool,
    pub minutes: i32,
    pub subbed_due_to_injury: bool,
    pub yellow_cards: i32,
    pub red_cards: i32,
    pub shots: Vec<SheetShot>,
}

/// A complete match report to be recorded in one go. Team, campaign and
/// player rows are resolved with get-or-create.
#[derive(Debug, Clone)]
pub struct NewMatchSheet {
    pub date: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub campaign: Option<String>,
    pub appearances: Vec<SheetAppearance>,
}

/// Everything recorded for one match, as stored.
#[derive(Debug, Clone)]
pub struct MatchSheet {
    pub match_info: Match,
    pub stats: Option<MatchStats>,
    pub player_matches: Vec<PlayerMatch>,
    pub shots: Vec<Shot>,
    pub goals: Vec<Goal>,
    pub assists: Vec<Assist>,
}

pub type ArcStatsService = Arc<Box<dyn StatsService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait StatsService {
    async fn record_match(&self, sheet: &NewMatchSheet) -> ServiceResult<MatchSheet>;
    async fn get_match_sheet(&self, id: MatchId) -> ServiceResult<Option<MatchSheet>>;
    async fn delete_match(&self, id: MatchId) -> ServiceResult<bool>;
    async fn delete_shot(&self, id: ShotId) -> ServiceResult<bool>;
    async fn delete_player_match(&self, id: PlayerMatchId) -> ServiceResult<bool>;
}

pub struct StatsServiceImpl {
    team_repository: ArcTeamRepository,
    player_repository: ArcPlayerRepository,
    campaign_repository: ArcCampaignRepository,
    match_repository: ArcMatchRepository,
    stats_repository: ArcStatsRepository,
}

impl StatsServiceImpl {
    pub fn new(
        team_repository: ArcTeamRepository,
        player_repository: ArcPlayerRepository,
        campaign_repository: ArcCampaignRepository,
        match_repository: ArcMatchRepository,
        stats_repository: ArcStatsRepository,
    ) -> Self {
        Self {
            team_repository,
            player_repository,
            campaign_repository,
            match_repository,
            stats_repository,
        }
    }
}

#[async_trait::async_trait]
impl StatsService for StatsServiceImpl {
    async fn record_match(&self, sheet: &NewMatchSheet) -> ServiceResult<MatchSheet> {
        let home = self.team_repository.get_or_create_team(&sheet.home_team).await?;
        let away = self.team_repository.get_or_create_team(&sheet.away_team).await?;
        let campaign = match &sheet.campaign {
            Some(name) => Some(self.campaign_repository.get_or_create_campaign(name).await?),
            None => None,
        };

        let match_row = self
            .match_repository
            .create_match(&NewMatch {
                date: sheet.date,
                home_team_id: home.id,
                away_team_id: away.id,
                campaign_id: campaign.map(|c| c.id),
            })
            .await?;

        // First pass: participation rows, so assists can reference any
        // appearance regardless of ordering on the sheet.
        let mut appearance_ids: HashMap<(Side, i32), PlayerMatchId> = HashMap::new();
        for appearance in &sheet.appearances {
            let team_id = match appearance.side {
                Side::Home => home.id,
                Side::Away => away.id,
            };
            let player = self
                .player_repository
                .get_or_create_player(&appearance.player_name, appearance.player_number, Some(team_id))
                .await?;
            let pm = self
                .stats_repository
                .create_player_match(&NewPlayerMatch {
                    player_id: player.id,
                    team_id,
                    match_id: match_row.id,
                    started: appearance.started,
                    minutes: appearance.minutes,
                    subbed_due_to_injury: appearance.subbed_due_to_injury,
                    yellow_cards: appearance.yellow_cards,
                    red_cards: appearance.red_cards,
                })
                .await?;
            appearance_ids.insert((appearance.side, appearance.player_number), pm.id);
        }

        // Second pass: shots, goals and assists.
        for appearance in &sheet.appearances {
            let pm_id = appearance_ids[&(appearance.side, appearance.player_number)];
            for shot in &appearance.shots {
                let shot_row = self
                    .stats_repository
                    .create_shot(&NewShot {
                        player_match_id: pm_id,
                        x: shot.x,
                        y: shot.y,
                        on_goal: shot.on_goal,
                    })
                    .await?;
                let Some(goal) = &shot.goal else {
                    continue;
                };
                let goal_row = self
                    .stats_repository
                    .create_goal(&NewGoal {
                        player_match_id: pm_id,
                        shot_id: shot_row.id,
                        minute: goal.minute,
                    })
                    .await?;
                if let Some(assist_by) = goal.assist_by {
                    let assist_pm_id = appearance_ids.get(&assist_by).ok_or_else(|| {
                        ServiceError::BadRequest(format!(
                            "Assist credited to number {} who is not on the sheet",
                            assist_by.1
                        ))
                    })?;
                    self.stats_repository
                        .create_assist(&NewAssist {
                            player_match_id: *assist_pm_id,
                            goal_id: goal_row.id,
                        })
                        .await?;
                }
            }
        }

        info!(
            "Recorded match {} ({} vs {}, {} appearances)",
            match_row.id,
            sheet.home_team,
            sheet.away_team,
            sheet.appearances.len()
        );

        self.get_match_sheet(match_row.id)
            .await?
            .ok_or(ServiceError::Internal("Recorded match vanished".into()))
    }

    async fn get_match_sheet(&self, id: MatchId) -> ServiceResult<Option<MatchSheet>> {
        let Some(match_info) = self.match_repository.get_match(id).await? else {
            return Ok(None);
        };
        let stats = self.match_repository.get_match_stats(id).await?;
        let player_matches = self.stats_repository.get_player_matches_for_match(id).await?;
        let mut shots = Vec::new();
        for pm in &player_matches {
            shots.extend(self.stats_repository.get_shots_for_player_match(pm.id).await?);
        }
        let goals = self.stats_repository.get_goals_for_match(id).await?;
        let assists = self.stats_repository.get_assists_for_match(id).await?;
        Ok(Some(MatchSheet {
            match_info,
            stats,
            player_matches,
            shots,
            goals,
            assists,
        }))
    }

    async fn delete_match(&self, id: MatchId) -> ServiceResult<bool> {
        let deleted = self.match_repository.delete_match(id).await?;
        if deleted {
            info!("Deleted match {} and its dependent records", id);
        }
        Ok(deleted)
    }

    async fn delete_shot(&self, id: ShotId) -> ServiceResult<bool> {
        let deleted = self.stats_repository.delete_shot(id).await?;
        if deleted {
            info!("Deleted shot {} and its dependent records", id);
        }
        Ok(deleted)
    }

    async fn delete_player_match(&self, id: PlayerMatchId) -> ServiceResult<bool> {
        let deleted = self.stats_repository.delete_player_match(id).await?;
        if deleted {
            info!("Deleted player match {} and its dependent records", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appearance_defaults() {
        let pm = NewPlayerMatch::new(1, 2, 3, true, 60);
        assert!(pm.started);
        assert_eq!(pm.minutes, 60);
        assert!(!pm.subbed_due_to_injury);
        assert_eq!(pm.yellow_cards, 0);
        assert_eq!(pm.red_cards, 0);
    }

    #[test]
    fn test_appearance_carries_cards_as_given() {
        let pm = NewPlayerMatch {
            subbed_due_to_injury: true,
            yellow_cards: 1,
            red_cards: 1,
            ..NewPlayerMatch::new(1, 2, 3, false, 45)
        };
        assert!(!pm.started);
        assert!(pm.subbed_due_to_injury);
        assert_eq!(pm.yellow_cards, 1);
        assert_eq!(pm.red_cards, 1);
    }
}
