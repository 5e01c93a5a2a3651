use std::str::FromStr;

use anyhow::Context;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlConnectOptions;

pub async fn init_db(database_url: &str, database_name: &str) -> anyhow::Result<MySqlPool> {
    let options = MySqlConnectOptions::from_str(database_url)
        .context("DATABASE_URL is not a valid MySQL connection string")?
        .database(database_name);

    MySqlPool::connect_with(options)
        .await
        .context("Failed to connect to database")
}
