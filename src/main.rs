use log::info;
use matchday_domain::{roster::TeamRepository, user::UserRepository};
use matchday_persistence_sqlite::{create_db_pool, schema};

mod app;
mod logs;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    logs::init_logger();

    let pool = create_db_pool().await;
    schema::create_schema(&pool)
        .await
        .expect("Failed to create schema");

    let app = app::build_app(pool);

    let teams = app
        .team_repository
        .get_teams()
        .await
        .expect("Failed to query teams");
    let users = app
        .user_repository
        .get_usernames()
        .await
        .expect("Failed to query users");

    info!(
        "Matchday storage ready: {} teams, {} users",
        teams.len(),
        users.len()
    );
}
