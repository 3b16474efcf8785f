use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub mod matches;
pub mod rosters;
pub mod schema;
pub mod stats;
pub mod users;

/// Open the database pool at the path given by `MATCHDAY_DB`, creating the
/// file if it does not exist yet.
pub async fn create_db_pool() -> Pool<Sqlite> {
    let db_path = std::env::var("MATCHDAY_DB").expect("MATCHDAY_DB env var not set");

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("Failed to create pool")
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> Pool<Sqlite> {
    let connect_options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    // A single connection so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to create in-memory pool");

    schema::create_schema(&pool)
        .await
        .expect("Failed to create schema");
    pool
}
