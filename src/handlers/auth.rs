use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use askama::Template;
use chrono::Utc;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{render, PageContext};
use crate::{
    activity::{log_activity, log_activity_for},
    database::Database,
    middleware::{end_session, get_current_user, set_flash, start_session, FlashKind},
    models::{NewActivity, User},
    state::AppState,
    utils::{hash_password, verify_password},
};

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    page: PageContext,
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    page: PageContext,
    error: String,
    username: String,
    next: String,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    page: PageContext,
    error: String,
    username: String,
    email: String,
}

#[derive(Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    next: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
}

/// Only same-site absolute paths are accepted as post-login targets.
///
/// Browsers drop tabs and newlines from a `Location` before resolving it,
/// so `/\t/host` would become `//host`. Any control or whitespace
/// character rejects the target outright.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    if next.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return None;
    }
    let is_local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    is_local.then(|| next.to_string())
}

pub async fn home(State(state): State<AppState>, cookies: Cookies) -> Result<Response, Response> {
    if get_current_user(&cookies, &state).await.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let template = HomeTemplate {
        page: PageContext::anonymous(&cookies),
    };
    render(&template).map(IntoResponse::into_response)
}

pub async fn login_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<NextQuery>,
) -> Result<Response, Response> {
    if get_current_user(&cookies, &state).await.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let template = LoginTemplate {
        page: PageContext::anonymous(&cookies),
        error: String::new(),
        username: String::new(),
        next: safe_next(query.next.as_deref()).unwrap_or_default(),
    };
    render(&template).map(IntoResponse::into_response)
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, Response> {
    if get_current_user(&cookies, &state).await.is_some() {
        return Ok(Redirect::to("/dashboard"));
    }

    let next = safe_next(form.next.as_deref().or(query.next.as_deref()));
    let login_failed = |message: &str, status: StatusCode| -> Response {
        let template = LoginTemplate {
            page: PageContext::anonymous(&cookies),
            error: message.to_string(),
            username: form.username.clone(),
            next: next.clone().unwrap_or_default(),
        };
        match render(&template) {
            Ok(html) => (status, html).into_response(),
            Err(response) => response,
        }
    };

    let user = match authenticate_user(&state.db, &form.username, &form.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            log::warn!("failed login attempt for '{}'", form.username);
            return Err(login_failed(
                "Invalid username or password. Please try again.",
                StatusCode::UNAUTHORIZED,
            ));
        }
        Err(e) => {
            log::error!("login lookup failed: {}", e);
            return Err(login_failed(
                "Authentication failed",
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
    };

    if let Err(e) = start_session(&cookies, &state, &user).await {
        log::error!("failed to start session for {}: {}", user.username, e);
        return Err(login_failed(
            "Authentication failed",
            StatusCode::INTERNAL_SERVER_ERROR,
        ));
    }

    log_activity_for(
        &state.db,
        user.user_id,
        NewActivity::new(
            "login",
            "users",
            user.user_id,
            format!("User {} logged in", user.username),
        ),
    )
    .await;

    set_flash(&cookies, FlashKind::Success, format!("Welcome back, {}!", user.username));
    Ok(Redirect::to(next.as_deref().unwrap_or("/dashboard")))
}

pub async fn register_page(State(state): State<AppState>, cookies: Cookies) -> Result<Response, Response> {
    if get_current_user(&cookies, &state).await.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let template = RegisterTemplate {
        page: PageContext::anonymous(&cookies),
        error: String::new(),
        username: String::new(),
        email: String::new(),
    };
    render(&template).map(IntoResponse::into_response)
}

pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, Response> {
    if get_current_user(&cookies, &state).await.is_some() {
        return Ok(Redirect::to("/dashboard"));
    }

    let rejected = |message: &str, status: StatusCode| -> Response {
        let template = RegisterTemplate {
            page: PageContext::anonymous(&cookies),
            error: message.to_string(),
            username: form.username.clone(),
            email: form.email.clone(),
        };
        match render(&template) {
            Ok(html) => (status, html).into_response(),
            Err(response) => response,
        }
    };

    let username = form.username.trim();
    let email = form.email.trim();
    if username.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(rejected("All fields are required.", StatusCode::BAD_REQUEST));
    }
    if form.password != form.confirm_password {
        return Err(rejected("Passwords do not match!", StatusCode::BAD_REQUEST));
    }

    match taken_identity(&state.db, username, email).await {
        Ok(Some(Taken::Username)) => {
            return Err(rejected("Username already exists!", StatusCode::BAD_REQUEST))
        }
        Ok(Some(Taken::Email)) => {
            return Err(rejected("Email already registered!", StatusCode::BAD_REQUEST))
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("registration lookup failed: {}", e);
            return Err(rejected(
                "Registration failed",
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
    }

    let password_hash = match hash_password(&form.password, state.config.bcrypt_cost) {
        Ok(hash) => hash,
        Err(e) => {
            log::error!("failed to hash password: {}", e);
            return Err(rejected(
                "Failed to process password",
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
    };

    if let Err(e) = create_user_in_db(&state.db, username, email, &password_hash).await {
        log::warn!("failed to create user '{}': {}", username, e);
        return Err(rejected(
            "Username or email already exists",
            StatusCode::BAD_REQUEST,
        ));
    }

    log::info!("registered new user '{}'", username);
    set_flash(&cookies, FlashKind::Success, "Registration successful! Please log in.");
    Ok(Redirect::to("/login"))
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let Some(user) = get_current_user(&cookies, &state).await else {
        set_flash(&cookies, FlashKind::Info, "Please log in to access this page.");
        return Redirect::to("/login");
    };

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "logout",
            "users",
            user.user_id,
            format!("User {} logged out", user.username),
        ),
    )
    .await;
    end_session(&cookies, &state, &user).await;

    set_flash(&cookies, FlashKind::Info, "You have been logged out successfully.");
    Redirect::to("/")
}

async fn authenticate_user(
    db: &Database,
    username: &str,
    password: &str,
) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await?;

    Ok(user.filter(|user| verify_password(password, &user.password_hash).unwrap_or(false)))
}

enum Taken {
    Username,
    Email,
}

async fn taken_identity(db: &Database, username: &str, email: &str) -> Result<Option<Taken>, sqlx::Error> {
    let username_taken = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(db)
        .await?
        > 0;
    if username_taken {
        return Ok(Some(Taken::Username));
    }

    let email_taken = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(db)
        .await?
        > 0;
    Ok(email_taken.then_some(Taken::Email))
}

async fn create_user_in_db(
    db: &Database,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, join_date, is_admin)
        VALUES (?, ?, ?, ?, 0)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(Utc::now().naive_utc())
    .fetch_one(db)
    .await
}
