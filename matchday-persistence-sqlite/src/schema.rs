use sqlx::{Pool, Sqlite};

/// Full schema, children declared after their parents. Foreign keys document
/// the dependency direction; deletes are performed as explicit child-first
/// traversals, so no `ON DELETE` actions are declared.
pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    number INTEGER NOT NULL,
    team_id INTEGER REFERENCES teams(id)
);

CREATE TABLE IF NOT EXISTS campaigns (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    home_team_id INTEGER NOT NULL REFERENCES teams(id),
    away_team_id INTEGER NOT NULL REFERENCES teams(id),
    campaign_id INTEGER REFERENCES campaigns(id)
);

CREATE TABLE IF NOT EXISTS match_stats (
    match_id INTEGER PRIMARY KEY REFERENCES matches(id),
    home_passes INTEGER NOT NULL DEFAULT 0,
    home_passes_completed INTEGER NOT NULL DEFAULT 0,
    away_passes INTEGER NOT NULL DEFAULT 0,
    away_passes_completed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS player_matches (
    id INTEGER PRIMARY KEY,
    player_id INTEGER NOT NULL REFERENCES players(id),
    team_id INTEGER NOT NULL REFERENCES teams(id),
    match_id INTEGER NOT NULL REFERENCES matches(id),
    started INTEGER NOT NULL DEFAULT 0,
    minutes INTEGER NOT NULL DEFAULT 0,
    subbed_due_to_injury INTEGER NOT NULL DEFAULT 0,
    yellow_cards INTEGER NOT NULL DEFAULT 0,
    red_cards INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS shots (
    id INTEGER PRIMARY KEY,
    player_match_id INTEGER NOT NULL REFERENCES player_matches(id),
    x INTEGER NOT NULL,
    y INTEGER NOT NULL,
    on_goal INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY,
    player_match_id INTEGER NOT NULL REFERENCES player_matches(id),
    shot_id INTEGER NOT NULL REFERENCES shots(id),
    minute INTEGER
);

CREATE TABLE IF NOT EXISTS assists (
    id INTEGER PRIMARY KEY,
    player_match_id INTEGER NOT NULL REFERENCES player_matches(id),
    goal_id INTEGER NOT NULL REFERENCES goals(id)
);
";

pub async fn create_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}
