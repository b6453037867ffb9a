use chrono::Utc;

use crate::{
    database::Database,
    middleware::CurrentUser,
    models::{ActivityLog, NewActivity},
};

const ACTIVITY_SELECT: &str = r#"
    SELECT a.log_id, a.user_id, u.username, a.action_type, a.affected_table,
           a.affected_id, a.description, a.timestamp
    FROM activity_logs a
    LEFT JOIN users u ON u.user_id = a.user_id
"#;

/// Appends an entry to the audit trail. Failures are logged and swallowed
/// so they never undo the action being recorded.
pub async fn log_activity(db: &Database, user: &CurrentUser, activity: NewActivity) {
    log_activity_for(db, user.user_id, activity).await
}

pub async fn log_activity_for(db: &Database, user_id: i64, activity: NewActivity) {
    let result = sqlx::query(
        r#"
        INSERT INTO activity_logs (user_id, action_type, affected_table, affected_id, description, timestamp)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(activity.action_type)
    .bind(activity.affected_table)
    .bind(activity.affected_id)
    .bind(&activity.description)
    .bind(Utc::now().naive_utc())
    .execute(db)
    .await;

    match result {
        Ok(_) => log::info!(
            "user {} {} on {}: {}",
            user_id,
            activity.action_type,
            activity.affected_table,
            activity.description
        ),
        Err(e) => log::error!("failed to record {} activity: {}", activity.action_type, e),
    }
}

pub async fn recent_for_user(db: &Database, user_id: i64, limit: i64) -> Result<Vec<ActivityLog>, sqlx::Error> {
    let sql = format!(
        "{} WHERE a.user_id = ? ORDER BY a.timestamp DESC, a.log_id DESC LIMIT ?",
        ACTIVITY_SELECT
    );
    sqlx::query_as::<_, ActivityLog>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
}

pub async fn recent_for_all(db: &Database, limit: i64) -> Result<Vec<ActivityLog>, sqlx::Error> {
    let sql = format!("{} ORDER BY a.timestamp DESC, a.log_id DESC LIMIT ?", ACTIVITY_SELECT);
    sqlx::query_as::<_, ActivityLog>(&sql)
        .bind(limit)
        .fetch_all(db)
        .await
}

pub async fn count_for_user(db: &Database, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activity_logs WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await
}
