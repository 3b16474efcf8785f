use matchday_domain::{
    ServiceError, ServiceResult,
    user::{NewUser, User, UserId, UserRepository, Username},
};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

pub struct SqliteUserRepository {
    pool: Pool<Sqlite>,
}

impl SqliteUserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &SqliteRow) -> sqlx::Result<User> {
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password")?,
        })
    }
}

#[async_trait::async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::user_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn get_user_by_name(&self, username: &str) -> ServiceResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        row.as_ref()
            .map(Self::user_from_row)
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn create_user(&self, user: &NewUser) -> ServiceResult<User> {
        let res = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    ServiceError::NotPossible(format!("Username {} is already taken", user.username))
                } else {
                    ServiceError::Internal(e.to_string())
                }
            })?;
        Ok(User {
            id: res.last_insert_rowid(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
        })
    }

    async fn update_password(&self, id: UserId, password_hash: String) -> ServiceResult<()> {
        sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_usernames(&self) -> ServiceResult<Vec<Username>> {
        sqlx::query_scalar("SELECT username FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}
