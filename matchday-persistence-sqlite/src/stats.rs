use matchday_domain::{
    ServiceError, ServiceResult,
    matches::MatchId,
    stats::{
        Assist, AssistId, Goal, GoalId, NewAssist, NewGoal, NewPlayerMatch, NewShot, PlayerMatch,
        PlayerMatchId, Shot, ShotId, StatsRepository,
    },
};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

pub struct SqliteStatsRepository {
    pool: Pool<Sqlite>,
}

impl SqliteStatsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn player_match_from_row(row: &SqliteRow) -> sqlx::Result<PlayerMatch> {
        Ok(PlayerMatch {
            id: row.try_get("id")?,
            player_id: row.try_get("player_id")?,
            team_id: row.try_get("team_id")?,
            match_id: row.try_get("match_id")?,
            started: row.try_get("started")?,
            minutes: row.try_get("minutes")?,
            subbed_due_to_injury: row.try_get("subbed_due_to_injury")?,
            yellow_cards: row.try_get("yellow_cards")?,
            red_cards: row.try_get("red_cards")?,
        })
    }

    fn shot_from_row(row: &SqliteRow) -> sqlx::Result<Shot> {
        Ok(Shot {
            id: row.try_get("id")?,
            player_match_id: row.try_get("player_match_id")?,
            x: row.try_get("x")?,
            y: row.try_get("y")?,
            on_goal: row.try_get("on_goal")?,
        })
    }

    fn goal_from_row(row: &SqliteRow) -> sqlx::Result<Goal> {
        Ok(Goal {
            id: row.try_get("id")?,
            player_match_id: row.try_get("player_match_id")?,
            shot_id: row.try_get("shot_id")?,
            minute: row.try_get("minute")?,
        })
    }

    fn assist_from_row(row: &SqliteRow) -> sqlx::Result<Assist> {
        Ok(Assist {
            id: row.try_get("id")?,
            player_match_id: row.try_get("player_match_id")?,
            goal_id: row.try_get("goal_id")?,
        })
    }
}

#[async_trait::async_trait]
impl StatsRepository for SqliteStatsRepository {
    async fn create_player_match(&self, pm: &NewPlayerMatch) -> ServiceResult<PlayerMatch> {
        let res = sqlx::query(
            "INSERT INTO player_matches
             (player_id, team_id, match_id, started, minutes, subbed_due_to_injury, yellow_cards, red_cards)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(pm.player_id)
        .bind(pm.team_id)
        .bind(pm.match_id)
        .bind(pm.started)
        .bind(pm.minutes)
        .bind(pm.subbed_due_to_injury)
        .bind(pm.yellow_cards)
        .bind(pm.red_cards)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(PlayerMatch {
            id: res.last_insert_rowid(),
            player_id: pm.player_id,
            team_id: pm.team_id,
            match_id: pm.match_id,
            started: pm.started,
            minutes: pm.minutes,
            subbed_due_to_injury: pm.subbed_due_to_injury,
            yellow_cards: pm.yellow_cards,
            red_cards: pm.red_cards,
        })
    }

    async fn get_player_match(&self, id: PlayerMatchId) -> ServiceResult<Option<PlayerMatch>> {
        let row = sqlx::query("SELECT * FROM player_matches WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::player_match_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_player_matches_for_match(
        &self,
        match_id: MatchId,
    ) -> ServiceResult<Vec<PlayerMatch>> {
        let rows = sqlx::query("SELECT * FROM player_matches WHERE match_id = ? ORDER BY id")
            .bind(match_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        rows.iter()
            .map(Self::player_match_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn delete_player_match(&self, id: PlayerMatchId) -> ServiceResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        // Goals can hang off this participation either as the scorer or via
        // one of its shots; assists either as the assisting player or via
        // one of those goals.
        let statements = [
            "DELETE FROM assists WHERE player_match_id = ?1
             OR goal_id IN
                (SELECT id FROM goals WHERE player_match_id = ?1
                 OR shot_id IN (SELECT id FROM shots WHERE player_match_id = ?1))",
            "DELETE FROM goals WHERE player_match_id = ?1
             OR shot_id IN (SELECT id FROM shots WHERE player_match_id = ?1)",
            "DELETE FROM shots WHERE player_match_id = ?1",
        ];
        for statement in statements {
            sqlx::query(statement)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
        }

        let res = sqlx::query("DELETE FROM player_matches WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(res.rows_affected() > 0)
    }

    async fn create_shot(&self, shot: &NewShot) -> ServiceResult<Shot> {
        let res = sqlx::query(
            "INSERT INTO shots (player_match_id, x, y, on_goal) VALUES (?, ?, ?, ?)",
        )
        .bind(shot.player_match_id)
        .bind(shot.x)
        .bind(shot.y)
        .bind(shot.on_goal)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Shot {
            id: res.last_insert_rowid(),
            player_match_id: shot.player_match_id,
            x: shot.x,
            y: shot.y,
            on_goal: shot.on_goal,
        })
    }

    async fn get_shot(&self, id: ShotId) -> ServiceResult<Option<Shot>> {
        let row = sqlx::query("SELECT * FROM shots WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::shot_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_shots_for_player_match(
        &self,
        player_match_id: PlayerMatchId,
    ) -> ServiceResult<Vec<Shot>> {
        let rows = sqlx::query("SELECT * FROM shots WHERE player_match_id = ? ORDER BY id")
            .bind(player_match_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        rows.iter()
            .map(Self::shot_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn delete_shot(&self, id: ShotId) -> ServiceResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        sqlx::query(
            "DELETE FROM assists WHERE goal_id IN (SELECT id FROM goals WHERE shot_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;

        sqlx::query("DELETE FROM goals WHERE shot_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let res = sqlx::query("DELETE FROM shots WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(res.rows_affected() > 0)
    }

    async fn create_goal(&self, goal: &NewGoal) -> ServiceResult<Goal> {
        let res = sqlx::query(
            "INSERT INTO goals (player_match_id, shot_id, minute) VALUES (?, ?, ?)",
        )
        .bind(goal.player_match_id)
        .bind(goal.shot_id)
        .bind(goal.minute)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Goal {
            id: res.last_insert_rowid(),
            player_match_id: goal.player_match_id,
            shot_id: goal.shot_id,
            minute: goal.minute,
        })
    }

    async fn get_goal(&self, id: GoalId) -> ServiceResult<Option<Goal>> {
        let row = sqlx::query("SELECT * FROM goals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::goal_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_goals_for_match(&self, match_id: MatchId) -> ServiceResult<Vec<Goal>> {
        let rows = sqlx::query(
            "SELECT g.* FROM goals g
             JOIN player_matches pm ON g.player_match_id = pm.id
             WHERE pm.match_id = ? ORDER BY g.id",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        rows.iter()
            .map(Self::goal_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn create_assist(&self, assist: &NewAssist) -> ServiceResult<Assist> {
        let res = sqlx::query("INSERT INTO assists (player_match_id, goal_id) VALUES (?, ?)")
            .bind(assist.player_match_id)
            .bind(assist.goal_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Assist {
            id: res.last_insert_rowid(),
            player_match_id: assist.player_match_id,
            goal_id: assist.goal_id,
        })
    }

    async fn get_assists_for_goal(&self, goal_id: GoalId) -> ServiceResult<Vec<Assist>> {
        let rows = sqlx::query("SELECT * FROM assists WHERE goal_id = ? ORDER BY id")
            .bind(goal_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        rows.iter()
            .map(Self::assist_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_assists_for_match(&self, match_id: MatchId) -> ServiceResult<Vec<Assist>> {
        let rows = sqlx::query(
            "SELECT a.* FROM assists a
             JOIN player_matches pm ON a.player_match_id = pm.id
             WHERE pm.match_id = ? ORDER BY a.id",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        rows.iter()
            .map(Self::assist_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        matches::SqliteMatchRepository, memory_pool, rosters::SqlitePlayerRepository,
        rosters::SqliteTeamRepository,
    };
    use chrono::{TimeZone, Utc};
    use matchday_domain::{
        matches::{MatchRepository, NewMatch},
        roster::{PlayerRepository, TeamRepository},
    };

    struct Fixture {
        pool: Pool<Sqlite>,
        stats: SqliteStatsRepository,
        matches: SqliteMatchRepository,
        match_id: MatchId,
        home_pms: Vec<PlayerMatch>,
        away_pms: Vec<PlayerMatch>,
    }

    async fn count(pool: &Pool<Sqlite>, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    /// One match with three appearances, mirroring a real match sheet.
    async fn fixture() -> Fixture {
        let pool = memory_pool().await;
        let teams = SqliteTeamRepository::new(pool.clone());
        let players = SqlitePlayerRepository::new(pool.clone());
        let matches = SqliteMatchRepository::new(pool.clone());
        let stats = SqliteStatsRepository::new(pool.clone());

        let home = teams.get_or_create_team("Lil' Barca").await.unwrap();
        let away = teams.get_or_create_team("Lil' Real Madrid").await.unwrap();
        let match_row = matches
            .create_match(&NewMatch {
                date: Utc.with_ymd_and_hms(2017, 11, 12, 8, 0, 0).unwrap(),
                home_team_id: home.id,
                away_team_id: away.id,
                campaign_id: None,
            })
            .await
            .unwrap();

        let mut home_pms = Vec::new();
        let mut away_pms = Vec::new();
        for (name, number, side_home, started) in [
            ("Lil' Messi", 10, true, true),
            ("Lil' Rakitic", 4, true, false),
            ("Lil' Ronaldo", 7, false, false),
        ] {
            let team_id = if side_home { home.id } else { away.id };
            let player = players
                .get_or_create_player(name, number, Some(team_id))
                .await
                .unwrap();
            let pm = stats
                .create_player_match(&NewPlayerMatch::new(
                    player.id,
                    team_id,
                    match_row.id,
                    started,
                    60,
                ))
                .await
                .unwrap();
            if side_home {
                home_pms.push(pm);
            } else {
                away_pms.push(pm);
            }
        }

        Fixture {
            pool,
            stats,
            matches,
            match_id: match_row.id,
            home_pms,
            away_pms,
        }
    }

    #[tokio::test]
    async fn test_player_match_round_trip() {
        let pool = memory_pool().await;
        let teams = SqliteTeamRepository::new(pool.clone());
        let players = SqlitePlayerRepository::new(pool.clone());
        let matches = SqliteMatchRepository::new(pool.clone());
        let stats = SqliteStatsRepository::new(pool.clone());

        let home = teams.get_or_create_team("Lil' Barca").await.unwrap();
        let away = teams.get_or_create_team("Lil' Real Madrid").await.unwrap();
        let match_row = matches
            .create_match(&NewMatch {
                date: Utc.with_ymd_and_hms(2017, 11, 12, 8, 0, 0).unwrap(),
                home_team_id: home.id,
                away_team_id: away.id,
                campaign_id: None,
            })
            .await
            .unwrap();
        let player = players
            .get_or_create_player("Lil' Messi", 10, Some(home.id))
            .await
            .unwrap();

        let pm = stats
            .create_player_match(&NewPlayerMatch {
                subbed_due_to_injury: true,
                yellow_cards: 1,
                ..NewPlayerMatch::new(player.id, home.id, match_row.id, true, 60)
            })
            .await
            .unwrap();

        let loaded = stats.get_player_match(pm.id).await.unwrap().unwrap();
        assert_eq!(loaded, pm);
        assert!(loaded.started);
        assert!(loaded.subbed_due_to_injury);
        assert_eq!(loaded.yellow_cards, 1);
        assert_eq!(loaded.red_cards, 0);
    }

    #[tokio::test]
    async fn test_delete_match_cascades_to_all_descendants() {
        let f = fixture().await;
        let scorer = &f.home_pms[0];
        let provider = &f.home_pms[1];
        let opponent = &f.away_pms[0];

        let shot1 = f
            .stats
            .create_shot(&NewShot {
                player_match_id: scorer.id,
                x: 30,
                y: 30,
                on_goal: true,
            })
            .await
            .unwrap();
        f.stats
            .create_shot(&NewShot {
                player_match_id: opponent.id,
                x: 40,
                y: 10,
                on_goal: false,
            })
            .await
            .unwrap();

        let goal = f
            .stats
            .create_goal(&NewGoal {
                player_match_id: scorer.id,
                shot_id: shot1.id,
                minute: Some(23),
            })
            .await
            .unwrap();
        f.stats
            .create_assist(&NewAssist {
                player_match_id: provider.id,
                goal_id: goal.id,
            })
            .await
            .unwrap();

        assert_eq!(count(&f.pool, "player_matches").await, 3);
        assert_eq!(count(&f.pool, "shots").await, 2);
        assert_eq!(count(&f.pool, "goals").await, 1);
        assert_eq!(count(&f.pool, "assists").await, 1);

        assert!(f.matches.delete_match(f.match_id).await.unwrap());

        assert_eq!(count(&f.pool, "matches").await, 0);
        assert_eq!(count(&f.pool, "player_matches").await, 0);
        assert_eq!(count(&f.pool, "shots").await, 0);
        assert_eq!(count(&f.pool, "goals").await, 0);
        assert_eq!(count(&f.pool, "assists").await, 0);

        // Teams and players are not part of the cascade.
        assert_eq!(count(&f.pool, "teams").await, 2);
        assert_eq!(count(&f.pool, "players").await, 3);
    }

    #[tokio::test]
    async fn test_delete_match_leaves_other_matches_alone() {
        let f = fixture().await;
        let other_match = f
            .matches
            .create_match(&NewMatch {
                date: Utc.with_ymd_and_hms(2017, 11, 19, 8, 0, 0).unwrap(),
                home_team_id: f.home_pms[0].team_id,
                away_team_id: f.away_pms[0].team_id,
                campaign_id: None,
            })
            .await
            .unwrap();
        let other_pm = f
            .stats
            .create_player_match(&NewPlayerMatch::new(
                f.home_pms[0].player_id,
                f.home_pms[0].team_id,
                other_match.id,
                true,
                90,
            ))
            .await
            .unwrap();
        let other_shot = f
            .stats
            .create_shot(&NewShot {
                player_match_id: other_pm.id,
                x: 5,
                y: 5,
                on_goal: true,
            })
            .await
            .unwrap();

        assert!(f.matches.delete_match(f.match_id).await.unwrap());

        assert_eq!(
            f.stats.get_player_match(other_pm.id).await.unwrap(),
            Some(other_pm)
        );
        assert_eq!(f.stats.get_shot(other_shot.id).await.unwrap(), Some(other_shot));
    }

    #[tokio::test]
    async fn test_delete_shot_cascades_to_goal_and_assist() {
        let f = fixture().await;
        let scorer = &f.home_pms[0];
        let provider = &f.home_pms[1];

        let shot = f
            .stats
            .create_shot(&NewShot {
                player_match_id: scorer.id,
                x: 10,
                y: 10,
                on_goal: true,
            })
            .await
            .unwrap();
        let goal = f
            .stats
            .create_goal(&NewGoal {
                player_match_id: scorer.id,
                shot_id: shot.id,
                minute: None,
            })
            .await
            .unwrap();
        let assist = f
            .stats
            .create_assist(&NewAssist {
                player_match_id: provider.id,
                goal_id: goal.id,
            })
            .await
            .unwrap();

        assert!(f.stats.delete_shot(shot.id).await.unwrap());

        assert!(f.stats.get_shot(shot.id).await.unwrap().is_none());
        assert!(f.stats.get_goal(goal.id).await.unwrap().is_none());
        assert!(f.stats.get_assists_for_goal(assist.goal_id).await.unwrap().is_empty());

        // The participation rows survive a shot delete.
        assert_eq!(count(&f.pool, "player_matches").await, 3);
    }

    #[tokio::test]
    async fn test_delete_shot_without_goal_removes_only_the_shot() {
        let f = fixture().await;
        let shot = f
            .stats
            .create_shot(&NewShot {
                player_match_id: f.away_pms[0].id,
                x: 40,
                y: 10,
                on_goal: false,
            })
            .await
            .unwrap();

        assert!(f.stats.delete_shot(shot.id).await.unwrap());
        assert!(!f.stats.delete_shot(shot.id).await.unwrap());
        assert_eq!(count(&f.pool, "player_matches").await, 3);
    }

    #[tokio::test]
    async fn test_delete_player_match_cascades_own_records_only() {
        let f = fixture().await;
        let scorer = &f.home_pms[0];
        let provider = &f.home_pms[1];
        let opponent = &f.away_pms[0];

        let shot = f
            .stats
            .create_shot(&NewShot {
                player_match_id: scorer.id,
                x: 30,
                y: 30,
                on_goal: true,
            })
            .await
            .unwrap();
        let goal = f
            .stats
            .create_goal(&NewGoal {
                player_match_id: scorer.id,
                shot_id: shot.id,
                minute: Some(70),
            })
            .await
            .unwrap();
        f.stats
            .create_assist(&NewAssist {
                player_match_id: provider.id,
                goal_id: goal.id,
            })
            .await
            .unwrap();
        let unrelated_shot = f
            .stats
            .create_shot(&NewShot {
                player_match_id: opponent.id,
                x: 1,
                y: 2,
                on_goal: false,
            })
            .await
            .unwrap();

        assert!(f.stats.delete_player_match(scorer.id).await.unwrap());

        assert!(f.stats.get_player_match(scorer.id).await.unwrap().is_none());
        assert!(f.stats.get_shot(shot.id).await.unwrap().is_none());
        assert!(f.stats.get_goal(goal.id).await.unwrap().is_none());
        assert_eq!(count(&f.pool, "assists").await, 0);

        // The other appearances and their shots are untouched.
        assert!(f.stats.get_player_match(provider.id).await.unwrap().is_some());
        assert_eq!(
            f.stats.get_shot(unrelated_shot.id).await.unwrap(),
            Some(unrelated_shot)
        );
    }

    #[tokio::test]
    async fn test_goals_and_assists_for_match() {
        let f = fixture().await;
        let scorer = &f.home_pms[0];
        let provider = &f.home_pms[1];

        let shot = f
            .stats
            .create_shot(&NewShot {
                player_match_id: scorer.id,
                x: 12,
                y: 8,
                on_goal: true,
            })
            .await
            .unwrap();
        let goal = f
            .stats
            .create_goal(&NewGoal {
                player_match_id: scorer.id,
                shot_id: shot.id,
                minute: Some(55),
            })
            .await
            .unwrap();
        let assist = f
            .stats
            .create_assist(&NewAssist {
                player_match_id: provider.id,
                goal_id: goal.id,
            })
            .await
            .unwrap();

        assert_eq!(f.stats.get_goals_for_match(f.match_id).await.unwrap(), vec![goal]);
        assert_eq!(
            f.stats.get_assists_for_match(f.match_id).await.unwrap(),
            vec![assist]
        );
        assert!(f.stats.get_goals_for_match(f.match_id + 1).await.unwrap().is_empty());
    }
}
