use axum::{http::Uri, response::Redirect};
use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use super::flash::{set_flash, FlashKind};
use crate::{
    database::Database,
    error::AppError,
    models::User,
    state::AppState,
    utils::{create_token, verify_token},
};

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    #[serde(skip)]
    pub session_id: Uuid,
}

pub async fn get_current_user(cookies: &Cookies, state: &AppState) -> Option<CurrentUser> {
    let token = cookies.get(AUTH_COOKIE)?.value().to_string();

    let claims = match verify_token(&token, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            log::debug!("rejecting session token: {}", e);
            return None;
        }
    };
    let user_id = claims.user_id()?;
    let session_id = claims.session_id()?;

    // The token alone is not enough: the session must still exist server-side.
    sqlx::query_as::<_, CurrentUser>(
        r#"
        SELECT u.user_id, u.username, u.email, u.is_admin, s.session_id
        FROM sessions s
        JOIN users u ON u.user_id = s.user_id
        WHERE s.session_id = ? AND s.user_id = ? AND s.expires_at > ?
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(Utc::now().naive_utc())
    .fetch_optional(&state.db)
    .await
    .map_err(|e| log::error!("failed to load session: {}", e))
    .ok()?
}

/// Drops sessions whose expiry has passed. Returns how many went.
pub async fn purge_expired_sessions(db: &Database, now: NaiveDateTime) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Records a new session for `user` and hands the browser its token.
pub async fn start_session(cookies: &Cookies, state: &AppState, user: &User) -> Result<(), AppError> {
    let session_id = Uuid::new_v4();
    let now = Utc::now();
    let expires_at = now + Duration::hours(state.config.session_hours);

    match purge_expired_sessions(&state.db, now.naive_utc()).await {
        Ok(0) => {}
        Ok(n) => log::debug!("purged {} expired sessions", n),
        Err(e) => log::warn!("failed to purge expired sessions: {}", e),
    }

    sqlx::query("INSERT INTO sessions (session_id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(session_id)
        .bind(user.user_id)
        .bind(now.naive_utc())
        .bind(expires_at.naive_utc())
        .execute(&state.db)
        .await?;

    let token = create_token(
        user.user_id,
        session_id,
        user.username.clone(),
        expires_at,
        &state.config.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("failed to sign session token: {}", e)))?;

    let cookie = Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(state.config.session_hours))
        .build();
    cookies.add(cookie);

    Ok(())
}

pub async fn end_session(cookies: &Cookies, state: &AppState, user: &CurrentUser) {
    if let Err(e) = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
        .bind(user.session_id)
        .execute(&state.db)
        .await
    {
        log::error!("failed to delete session for user {}: {}", user.user_id, e);
    }
    cookies.remove(Cookie::build((AUTH_COOKIE, "")).path("/").build());
}

/// Page guard: anonymous visitors are sent to the login form, which
/// returns them to `uri` afterwards.
pub async fn require_page_user(
    cookies: &Cookies,
    state: &AppState,
    uri: &Uri,
) -> Result<CurrentUser, Redirect> {
    match get_current_user(cookies, state).await {
        Some(user) => Ok(user),
        None => {
            set_flash(cookies, FlashKind::Info, "Please log in to access this page.");
            let next = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            Err(Redirect::to(&format!("/login?next={}", urlencoding::encode(next))))
        }
    }
}

pub async fn require_api_user(cookies: &Cookies, state: &AppState) -> Result<CurrentUser, AppError> {
    get_current_user(cookies, state)
        .await
        .ok_or(AppError::Unauthorized)
}
