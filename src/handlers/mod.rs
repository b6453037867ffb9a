pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod insights;
pub mod inventory;
pub mod products;
pub mod purchases;
pub mod sales;
pub mod suppliers;

use askama::Template;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{Local, NaiveDate};
use tower_cookies::Cookies;

use crate::{
    error::{AppError, AppResult},
    middleware::{take_flash, CurrentUser, Flash},
    models::DATE_FORMAT,
};

pub type PageResult = Result<Html<String>, Response>;

/// What the shared layout needs: who is logged in, which nav item is
/// active and any pending flash message.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub logged_in: bool,
    pub username: String,
    pub is_admin: bool,
    pub active: &'static str,
    pub flash: Option<Flash>,
}

impl PageContext {
    pub fn anonymous(cookies: &Cookies) -> Self {
        Self {
            logged_in: false,
            username: String::new(),
            is_admin: false,
            active: "",
            flash: take_flash(cookies),
        }
    }

    pub fn for_user(cookies: &Cookies, user: &CurrentUser, active: &'static str) -> Self {
        Self {
            logged_in: true,
            username: user.username.clone(),
            is_admin: user.is_admin,
            active,
            flash: take_flash(cookies),
        }
    }
}

pub fn render<T: Template>(template: &T) -> PageResult {
    template.render().map(Html).map_err(|e| {
        log::error!("failed to render template: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Unwraps a JSON body, turning extractor rejections into a 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

pub fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::bad_request(format!("Missing required field '{}'", field)))
}

/// Parses an optional `YYYY-MM-DD` value; blank counts as absent.
pub fn parse_date(value: Option<&str>, field: &str) -> AppResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                AppError::bad_request(format!(
                    "Invalid {} '{}', expected YYYY-MM-DD",
                    field, raw
                ))
            }),
    }
}
