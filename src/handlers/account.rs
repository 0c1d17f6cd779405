use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::{form_message, redirect, render, require_login, Access};
use crate::error::AppError;
use crate::templates::Page;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub password: String,
    pub npassword: String,
    pub npassword2: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailForm {
    pub email: String,
    pub password: String,
}

pub async fn user(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if let Access::Denied(response) = require_login(&req, &state).await? {
        return Ok(response);
    }
    render(&state, Page::User, None)
}

pub async fn update_password(
    req: HttpRequest,
    form: web::Form<PasswordForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = match require_login(&req, &state).await? {
        Access::Granted(session) => session,
        Access::Denied(response) => return Ok(response),
    };
    if form.npassword.is_empty() && form.npassword2.is_empty() {
        return Ok(redirect("/user"));
    }

    let result = state
        .auth
        .change_password(&session.user_id, &form.password, &form.npassword, &form.npassword2)
        .await;
    match result {
        Ok(()) => render(&state, Page::User, Some("Your password was updated.")),
        Err(e) => render(&state, Page::User, Some(&form_message(e)?)),
    }
}

pub async fn update_email(
    req: HttpRequest,
    form: web::Form<EmailForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = match require_login(&req, &state).await? {
        Access::Granted(session) => session,
        Access::Denied(response) => return Ok(response),
    };
    if form.email.is_empty() {
        return Ok(redirect("/user"));
    }

    match state.auth.change_email(&session.user_id, &form.password, &form.email).await {
        Ok(user) => {
            let message = format!("Your email was updated to {}", user.email);
            render(&state, Page::User, Some(&message))
        }
        Err(e) => render(&state, Page::User, Some(&form_message(e)?)),
    }
}
