use axum::{extract::State, response::Json};
use tower_cookies::Cookies;

use crate::{
    activity,
    error::{AppError, AppResult},
    middleware::require_api_user,
    models::ActivityLog,
    state::AppState,
};

const OWN_LOG_LIMIT: i64 = 50;
const ALL_LOG_LIMIT: i64 = 100;

pub async fn my_activity(
    State(state): State<AppState>,
    cookies: Cookies,
) -> AppResult<Json<Vec<ActivityLog>>> {
    let user = require_api_user(&cookies, &state).await?;
    let entries = activity::recent_for_user(&state.db, user.user_id, OWN_LOG_LIMIT).await?;
    Ok(Json(entries))
}

pub async fn all_activity(
    State(state): State<AppState>,
    cookies: Cookies,
) -> AppResult<Json<Vec<ActivityLog>>> {
    let user = require_api_user(&cookies, &state).await?;
    if !user.is_admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    let entries = activity::recent_for_all(&state.db, ALL_LOG_LIMIT).await?;
    Ok(Json(entries))
}
