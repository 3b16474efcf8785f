use matchday_domain::user::{NewUser, UserRepository};
use matchday_persistence_sqlite::{schema, users::SqliteUserRepository};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: add_user <username> <password>");
        std::process::exit(1);
    }

    let db_path = std::env::var("MATCHDAY_DB").expect("MATCHDAY_DB env var not set");

    let username = &args[1];
    let password = &args[2];

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

    let users = SqliteUserRepository::new(pool);

    let existing = users
        .get_user_by_name(username)
        .await
        .expect("Failed to query for existing user");
    if existing.is_some() {
        panic!("User with name [{}] already exists", username);
    }

    let new_user = NewUser::new(username, password).expect("Failed to hash password");
    users
        .create_user(&new_user)
        .await
        .expect("Failed to insert new user");

    println!("Created user [{}]", username);
}
