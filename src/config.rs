use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    /// Report another user's task as missing (404) instead of forbidden (403).
    pub conceal_foreign_tasks: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://todo.db?mode=rwc".into());
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "todo-api".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "todo-api-users".into()),
            ttl_minutes: checked_ttl(
                "JWT_TTL_MINUTES",
                parse_env("JWT_TTL_MINUTES").unwrap_or(60),
            )?,
            refresh_ttl_minutes: checked_ttl(
                "JWT_REFRESH_TTL_MINUTES",
                parse_env("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
            )?,
        };
        Ok(Self {
            database_url,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS").unwrap_or(5),
            jwt,
            conceal_foreign_tasks: std::env::var("TASKS_CONCEAL_FOREIGN")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
        })
    }
}

/// Ten years, in minutes.
pub const MAX_TTL_MINUTES: i64 = 525_600 * 10;

fn checked_ttl(key: &str, minutes: i64) -> anyhow::Result<i64> {
    anyhow::ensure!(
        (1..=MAX_TTL_MINUTES).contains(&minutes),
        "{key} must be between 1 and {MAX_TTL_MINUTES} minutes, got {minutes}"
    );
    Ok(minutes)
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{checked_ttl, parse_flag, MAX_TTL_MINUTES};

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("No"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn ttl_must_be_positive_and_bounded() {
        assert_eq!(checked_ttl("JWT_TTL_MINUTES", 60).unwrap(), 60);
        assert_eq!(checked_ttl("JWT_TTL_MINUTES", MAX_TTL_MINUTES).unwrap(), MAX_TTL_MINUTES);
        assert!(checked_ttl("JWT_TTL_MINUTES", 0).is_err());
        assert!(checked_ttl("JWT_TTL_MINUTES", -5).is_err());
        let err = checked_ttl("JWT_REFRESH_TTL_MINUTES", 10_000_000_000).unwrap_err();
        assert!(err.to_string().contains("JWT_REFRESH_TTL_MINUTES"));
    }
}
