use matchday_domain::{
    ServiceError, ServiceResult,
    matches::{
        Campaign, CampaignId, CampaignRepository, Match, MatchId, MatchRepository, MatchStats,
        NewMatch,
    },
    roster::TeamId,
};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

pub struct SqliteCampaignRepository {
    pool: Pool<Sqlite>,
}

impl SqliteCampaignRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn campaign_from_row(row: &SqliteRow) -> sqlx::Result<Campaign> {
        Ok(Campaign {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

#[async_trait::async_trait]
impl CampaignRepository for SqliteCampaignRepository {
    async fn get_campaign_by_id(&self, id: CampaignId) -> ServiceResult<Option<Campaign>> {
        let row = sqlx::query("SELECT * FROM campaigns WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::campaign_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_or_create_campaign(&self, name: &str) -> ServiceResult<Campaign> {
        let row = sqlx::query("SELECT * FROM campaigns WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if let Some(row) = row {
            return Self::campaign_from_row(&row)
                .map_err(|e| ServiceError::Internal(e.to_string()));
        }
        let res = sqlx::query("INSERT INTO campaigns (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Campaign {
            id: res.last_insert_rowid(),
            name: name.to_string(),
        })
    }
}

pub struct SqliteMatchRepository {
    pool: Pool<Sqlite>,
}

impl SqliteMatchRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn match_from_row(row: &SqliteRow) -> sqlx::Result<Match> {
        Ok(Match {
            id: row.try_get("id")?,
            date: row.try_get("date")?,
            home_team_id: row.try_get("home_team_id")?,
            away_team_id: row.try_get("away_team_id")?,
            campaign_id: row.try_get("campaign_id")?,
        })
    }

    fn stats_from_row(row: &SqliteRow) -> sqlx::Result<MatchStats> {
        Ok(MatchStats {
            match_id: row.try_get("match_id")?,
            home_passes: row.try_get("home_passes")?,
            home_passes_completed: row.try_get("home_passes_completed")?,
            away_passes: row.try_get("away_passes")?,
            away_passes_completed: row.try_get("away_passes_completed")?,
        })
    }
}

#[async_trait::async_trait]
impl MatchRepository for SqliteMatchRepository {
    async fn create_match(&self, new_match: &NewMatch) -> ServiceResult<Match> {
        let res = sqlx::query(
            "INSERT INTO matches (date, home_team_id, away_team_id, campaign_id) VALUES (?, ?, ?, ?)",
        )
        .bind(new_match.date)
        .bind(new_match.home_team_id)
        .bind(new_match.away_team_id)
        .bind(new_match.campaign_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Match {
            id: res.last_insert_rowid(),
            date: new_match.date,
            home_team_id: new_match.home_team_id,
            away_team_id: new_match.away_team_id,
            campaign_id: new_match.campaign_id,
        })
    }

    async fn get_match(&self, id: MatchId) -> ServiceResult<Option<Match>> {
        let row = sqlx::query("SELECT * FROM matches WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::match_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_matches_for_team(&self, team_id: TeamId) -> ServiceResult<Vec<Match>> {
        let rows = sqlx::query(
            "SELECT * FROM matches WHERE home_team_id = ? OR away_team_id = ? ORDER BY date",
        )
        .bind(team_id)
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        rows.iter()
            .map(Self::match_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn delete_match(&self, id: MatchId) -> ServiceResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        // Children before parents: assists, goals, shots, participation
        // rows, aggregate stats, then the match itself.
        let statements = [
            "DELETE FROM assists WHERE player_match_id IN
                (SELECT id FROM player_matches WHERE match_id = ?1)
             OR goal_id IN
                (SELECT g.id FROM goals g
                 JOIN player_matches pm ON g.player_match_id = pm.id
                 WHERE pm.match_id = ?1)",
            "DELETE FROM goals WHERE player_match_id IN
                (SELECT id FROM player_matches WHERE match_id = ?1)
             OR shot_id IN
                (SELECT s.id FROM shots s
                 JOIN player_matches pm ON s.player_match_id = pm.id
                 WHERE pm.match_id = ?1)",
            "DELETE FROM shots WHERE player_match_id IN
                (SELECT id FROM player_matches WHERE match_id = ?1)",
            "DELETE FROM player_matches WHERE match_id = ?1",
            "DELETE FROM match_stats WHERE match_id = ?1",
        ];
        for statement in statements {
            sqlx::query(statement)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
        }

        let res = sqlx::query("DELETE FROM matches WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_match_stats(&self, stats: &MatchStats) -> ServiceResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO match_stats
             (match_id, home_passes, home_passes_completed, away_passes, away_passes_completed)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(stats.match_id)
        .bind(stats.home_passes)
        .bind(stats.home_passes_completed)
        .bind(stats.away_passes)
        .bind(stats.away_passes_completed)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_match_stats(&self, match_id: MatchId) -> ServiceResult<Option<MatchStats>> {
        let row = sqlx::query("SELECT * FROM match_stats WHERE match_id = ?")
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::stats_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}
