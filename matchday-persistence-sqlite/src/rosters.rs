use matchday_domain::{
    ServiceError, ServiceResult,
    roster::{NewPlayer, Player, PlayerId, PlayerRepository, Team, TeamId, TeamRepository},
};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

pub struct SqliteTeamRepository {
    pool: Pool<Sqlite>,
}

impl SqliteTeamRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn team_from_row(row: &SqliteRow) -> sqlx::Result<Team> {
        Ok(Team {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

#[async_trait::async_trait]
impl TeamRepository for SqliteTeamRepository {
    async fn create_team(&self, name: &str) -> ServiceResult<Team> {
        let res = sqlx::query("INSERT INTO teams (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    ServiceError::NotPossible(format!("Team {} already exists", name))
                } else {
                    ServiceError::Internal(e.to_string())
                }
            })?;
        Ok(Team {
            id: res.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn get_team_by_id(&self, id: TeamId) -> ServiceResult<Option<Team>> {
        let row = sqlx::query("SELECT * FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::team_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_team_by_name(&self, name: &str) -> ServiceResult<Option<Team>> {
        let row = sqlx::query("SELECT * FROM teams WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::team_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_or_create_team(&self, name: &str) -> ServiceResult<Team> {
        if let Some(team) = self.get_team_by_name(name).await? {
            return Ok(team);
        }
        self.create_team(name).await
    }

    async fn get_teams(&self) -> ServiceResult<Vec<Team>> {
        let rows = sqlx::query("SELECT * FROM teams ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        rows.iter()
            .map(Self::team_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

pub struct SqlitePlayerRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePlayerRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn player_from_row(row: &SqliteRow) -> sqlx::Result<Player> {
        Ok(Player {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            number: row.try_get("number")?,
            team_id: row.try_get("team_id")?,
        })
    }
}

#[async_trait::async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn create_player(&self, player: &NewPlayer) -> ServiceResult<Player> {
        let res = sqlx::query("INSERT INTO players (name, number, team_id) VALUES (?, ?, ?)")
            .bind(&player.name)
            .bind(player.number)
            .bind(player.team_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Player {
            id: res.last_insert_rowid(),
            name: player.name.clone(),
            number: player.number,
            team_id: player.team_id,
        })
    }

    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        let row = sqlx::query("SELECT * FROM players WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::player_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_or_create_player(
        &self,
        name: &str,
        number: i32,
        team_id: Option<TeamId>,
    ) -> ServiceResult<Player> {
        let row = sqlx::query("SELECT * FROM players WHERE name = ? AND number = ?")
            .bind(name)
            .bind(number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if let Some(row) = row {
            return Self::player_from_row(&row)
                .map_err(|e| ServiceError::Internal(e.to_string()));
        }
        self.create_player(&NewPlayer {
            name: name.to_string(),
            number,
            team_id,
        })
        .await
    }

    async fn get_players_for_team(&self, team_id: TeamId) -> ServiceResult<Vec<Player>> {
        let rows = sqlx::query("SELECT * FROM players WHERE team_id = ? ORDER BY number")
            .bind(team_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        rows.iter()
            .map(Self::player_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn assign_team(&self, id: PlayerId, team_id: Option<TeamId>) -> ServiceResult<()> {
        sqlx::query("UPDATE players SET team_id = ? WHERE id = ?")
            .bind(team_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_pool;

    #[tokio::test]
    async fn test_get_or_create_team_is_idempotent() {
        let repo = SqliteTeamRepository::new(memory_pool().await);

        assert!(repo.get_team_by_name("Cabras").await.unwrap().is_none());

        let team = repo.get_or_create_team("Cabras").await.unwrap();
        let team2 = repo.get_or_create_team("Cabras").await.unwrap();
        assert_eq!(team.id, team2.id);

        let all = repo.get_teams().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_create_team_rejects_duplicate_name() {
        let repo = SqliteTeamRepository::new(memory_pool().await);
        repo.create_team("Shark Tornado").await.unwrap();
        let err = repo.create_team("Shark Tornado").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotPossible(_)));
    }

    #[tokio::test]
    async fn test_player_without_team() {
        let pool = memory_pool().await;
        let repo = SqlitePlayerRepository::new(pool);

        let player = repo
            .create_player(&NewPlayer {
                name: "Lil' Messi".into(),
                number: 10,
                team_id: None,
            })
            .await
            .unwrap();
        assert_eq!(player.number, 10);
        assert_eq!(player.team_id, None);

        let reloaded = repo.get_player_by_id(player.id).await.unwrap().unwrap();
        assert_eq!(reloaded, player);
    }

    #[tokio::test]
    async fn test_player_team_assignment() {
        let pool = memory_pool().await;
        let teams = SqliteTeamRepository::new(pool.clone());
        let players = SqlitePlayerRepository::new(pool);

        let barca = teams.get_or_create_team("Barca").await.unwrap();
        let player = players
            .get_or_create_player("Lil' Ronaldhino", 11, Some(barca.id))
            .await
            .unwrap();
        assert_eq!(player.team_id, Some(barca.id));

        let squad = players.get_players_for_team(barca.id).await.unwrap();
        assert_eq!(squad, vec![player.clone()]);

        players.assign_team(player.id, None).await.unwrap();
        assert!(players.get_players_for_team(barca.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_or_create_player_returns_same_row() {
        let repo = SqlitePlayerRepository::new(memory_pool().await);
        let first = repo.get_or_create_player("Lil' Messi", 10, None).await.unwrap();
        let second = repo.get_or_create_player("Lil' Messi", 10, None).await.unwrap();
        assert_eq!(first.id, second.id);
    }
}
