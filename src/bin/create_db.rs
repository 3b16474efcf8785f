use matchday_domain::user::{NewUser, UserRepository};
use matchday_persistence_sqlite::{schema, users::SqliteUserRepository};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = std::env::var("MATCHDAY_DB").expect("MATCHDAY_DB env var not set");

    let parent = std::path::Path::new(&db_path)
        .parent()
        .expect("Failed to get parent directory of DB path");
    if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory for DB");
        println!("Created parent directory for DB at {}", parent.display());
    }

    if std::path::Path::new(&db_path).exists() {
        std::fs::remove_file(&db_path).expect("Failed to remove existing DB");
        println!("Removed existing DB at {}", db_path);
    }

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to create pool");

    schema::create_schema(&pool)
        .await
        .expect("Failed to create schema");
    println!("Created new DB at {}", db_path);

    let users = SqliteUserRepository::new(pool);
    for name in ["testuser", "testuser2"] {
        let new_user = NewUser::new(name, "pw").expect("Failed to hash password");
        users
            .create_user(&new_user)
            .await
            .expect("Failed to create user");
        println!("Created user {}", name);
    }
}
