use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::{form_message, gate, redirect, redirect_clearing, render_clearing, require_login, Access};
use crate::auth::SignupRequest;
use crate::error::AppError;
use crate::templates::Page;
use crate::AppState;

const SIGNUP_DONE: &str = "User was successfully created. Log in to continue.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn index(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let outcome = gate(&req, &state).await?;
    if outcome.is_logged_in() {
        return Ok(redirect("/home"));
    }
    render_clearing(&state, Page::Index, None, outcome.clear_cookie())
}

/// The login form lives on the index page.
pub async fn login_page(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let outcome = gate(&req, &state).await?;
    if outcome.is_logged_in() {
        return Ok(redirect("/home"));
    }
    Ok(redirect_clearing(&state, "/", outcome.clear_cookie()))
}

pub async fn login(
    req: HttpRequest,
    form: web::Form<LoginForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let outcome = gate(&req, &state).await?;
    if outcome.is_logged_in() {
        return Ok(redirect("/home"));
    }
    let clear_cookie = outcome.clear_cookie();

    match state.auth.login(&form.email, &form.password, Utc::now()).await {
        Ok(session) => Ok(HttpResponse::SeeOther()
            .cookie(state.gate.cookie(&session))
            .insert_header((header::LOCATION, "/home"))
            .finish()),
        Err(e) => render_clearing(&state, Page::Index, Some(&form_message(e)?), clear_cookie),
    }
}

pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let session = match require_login(&req, &state).await? {
        Access::Granted(session) => session,
        Access::Denied(response) => return Ok(response),
    };

    state.auth.logout(&session).await?;
    Ok(redirect_clearing(&state, "/", true))
}

/// The signup form lives on the index page.
pub async fn signup_page(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    login_page(req, state).await
}

pub async fn signup(
    req: HttpRequest,
    form: web::Form<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let outcome = gate(&req, &state).await?;
    if outcome.is_logged_in() {
        return Ok(redirect("/home"));
    }
    let clear_cookie = outcome.clear_cookie();

    match state.auth.signup(&form).await {
        Ok(user) => {
            info!("Signup completed for user {}", user.id);
            render_clearing(&state, Page::Index, Some(SIGNUP_DONE), clear_cookie)
        }
        Err(e) => render_clearing(&state, Page::Index, Some(&form_message(e)?), clear_cookie),
    }
}
