use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::FixedOffset;
use dotenvy::dotenv;

use crate::auth::gate::AccessPolicy;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub database_name: String,

    // Access control
    pub allowed_employee_ids: Vec<String>,
    pub require_directory_check: bool,

    // Reporting
    pub tz_offset: FixedOffset,
    pub strict_date_params: bool,
    pub export_prefix: String,

    pub session_ttl: Duration,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_api_per_min: u32,

    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: or_default("SERVER_ADDR", "0.0.0.0:5000"),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_name: or_default("DB_NAME", "attendance"),

            allowed_employee_ids: parse_list(&or_default("ALLOWED_EMPLOYEE_IDS", "")),
            require_directory_check: parse_var("REQUIRE_DIRECTORY_CHECK", "false")?,

            tz_offset: parse_var("TZ_OFFSET", "+07:00")?,
            strict_date_params: parse_var("STRICT_DATE_PARAMS", "false")?,
            export_prefix: or_default("EXPORT_FILE_PREFIX", "attendance"),

            session_ttl: Duration::from_secs(parse_var("SESSION_TTL_SECS", "28800")?), // 8 hours

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", "60")?,
            rate_api_per_min: parse_var("RATE_API_PER_MIN", "600")?,

            log_dir: or_default("LOG_DIR", "logs"),
        })
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(
            self.allowed_employee_ids.iter().cloned(),
            self.require_directory_check,
        )
    }
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = or_default(key, default);
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value '{raw}': {e}"))
}

/// Comma-separated list, blanks dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
