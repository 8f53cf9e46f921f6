use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::{
    password::{hash_password, verify_password},
    repo_types::User,
};
use crate::error::{AppError, AppResult};

pub const MAX_PASSWORD_LEN: usize = 128;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap();
    // Verified against when the username is unknown, so both failure paths
    // pay for one Argon2 verification.
    static ref DUMMY_HASH: String = hash_password("not-a-real-password").unwrap_or_default();
}

/// Trimmed and lowercased, so "Alice" and "alice" are the same account.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.is_empty() {
        return Err(AppError::Validation("password must not be empty".into()));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at most {MAX_PASSWORD_LEN} bytes"
        )));
    }
    Ok(())
}

/// Creates a user; `Conflict` when the username is already taken.
pub async fn register(db: &SqlitePool, username: &str, password: &str) -> AppResult<User> {
    let username = normalize_username(username);
    if !is_valid_username(&username) {
        warn!(%username, "invalid username");
        return Err(AppError::Validation(
            "username must be 3-32 characters of letters, digits, '_', '.' or '-'".into(),
        ));
    }
    validate_password(password)?;

    if User::find_by_username(db, &username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(AppError::Conflict("username already taken".into()));
    }

    let hash = hash_password(password)?;
    let user = User::create(db, &username, &hash).await.map_err(|e| match e {
        // lost a race with a concurrent registration
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("username already taken".into())
        }
        other => AppError::Database(other),
    })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Looks the user up and checks the password. Unknown users and wrong
/// passwords are indistinguishable to the caller.
pub async fn authenticate(db: &SqlitePool, username: &str, password: &str) -> AppResult<User> {
    let username = normalize_username(username);
    let invalid = || AppError::Authentication("invalid credentials".into());

    // Longer than any password register accepts; skip the Argon2 work.
    if password.len() > MAX_PASSWORD_LEN {
        warn!(%username, "login password over length limit");
        return Err(invalid());
    }

    let Some(user) = User::find_by_username(db, &username).await? else {
        let _ = verify_password(password, &DUMMY_HASH);
        warn!(%username, "login unknown username");
        return Err(invalid());
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(%username, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    info!(user_id = %user.id, username = %user.username, "user authenticated");
    Ok(user)
}
