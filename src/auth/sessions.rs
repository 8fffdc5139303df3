// src/auth/sessions.rs
//
// Attribution source for recibido_por / usuario_id: a logged-in user is just
// an email plus a session cookie. Raw tokens never touch the database; only
// their SHA-256 hash is stored.

use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::db::connection::now_millis;
use crate::errors::ServerError;

const SESSION_TTL_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000; // 7 days

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

/// Insert a user if they don't exist, then return the user id.
/// Email should already be normalized by caller (trim/lowercase).
pub fn get_or_create_user(conn: &Connection, email: &str, now: i64) -> Result<i64, ServerError> {
    conn.execute(
        "insert or ignore into users (email, created_at) values (?, ?)",
        params![email, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert user failed: {e}")))?;

    conn.query_row(
        "select id from users where email = ?",
        params![email],
        |row| row.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("select user id failed: {e}")))
}

pub fn create_session(conn: &Connection, user_id: i64, now: i64) -> Result<String, ServerError> {
    let mut raw = [0u8; 32];
    OsRng.fill_bytes(&mut raw);
    let raw_token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw);
    let hash = Sha256::digest(raw_token.as_bytes());

    conn.execute(
        "insert into sessions (user_id, token_hash, created_at, expires_at)
         values (?, ?, ?, ?)",
        params![user_id, hash.as_slice(), now, now + SESSION_TTL_MILLIS],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;

    conn.execute(
        "update users set last_login_at = ? where id = ?",
        params![now, user_id],
    )
    .map_err(|e| ServerError::DbError(format!("update last_login failed: {e}")))?;

    Ok(raw_token)
}

pub fn load_user_from_session(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<CurrentUser>, ServerError> {
    let hash = Sha256::digest(raw_token.as_bytes());

    conn.query_row(
        "select u.id, u.email
         from sessions s
         join users u on u.id = s.user_id
         where s.token_hash = ?
           and s.expires_at > ?
           and s.revoked_at is null",
        params![hash.as_slice(), now],
        |row| {
            Ok(CurrentUser {
                id: row.get(0)?,
                email: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}

pub fn revoke_session(conn: &Connection, raw_token: &str, now: i64) -> Result<(), ServerError> {
    let hash = Sha256::digest(raw_token.as_bytes());
    conn.execute(
        "update sessions set revoked_at = ? where token_hash = ? and revoked_at is null",
        params![now, hash.as_slice()],
    )
    .map_err(|e| ServerError::DbError(format!("revoke session failed: {e}")))?;
    Ok(())
}

/// Login in one step: normalize the email, upsert the user, open a session.
/// Returns the raw cookie token.
pub fn login(conn: &Connection, email: &str) -> Result<String, ServerError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ServerError::BadRequest("email invalido".into()));
    }
    let now = now_millis();
    let user_id = get_or_create_user(conn, &email, now)?;
    create_session(conn, user_id, now)
}
