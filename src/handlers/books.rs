use actix_web::http::header::ContentType;
use actix_web::{web, HttpRequest, HttpResponse};

use super::{form_message, redirect, render, require_login, Access};
use crate::db::models::BookDraft;
use crate::error::AppError;
use crate::templates::Page;
use crate::AppState;

pub async fn home(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let session = match require_login(&req, &state).await? {
        Access::Granted(session) => session,
        Access::Denied(response) => return Ok(response),
    };

    let books = state.library.shelf(&session.user_id).await?;
    let body = state.templates.render_home(&books)?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(body))
}

pub async fn book(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if let Access::Denied(response) = require_login(&req, &state).await? {
        return Ok(response);
    }
    render(&state, Page::Book, None)
}

pub async fn new_book(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if let Access::Denied(response) = require_login(&req, &state).await? {
        return Ok(response);
    }
    render(&state, Page::NewBook, None)
}

pub async fn save_book(
    req: HttpRequest,
    form: web::Form<BookDraft>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = match require_login(&req, &state).await? {
        Access::Granted(session) => session,
        Access::Denied(response) => return Ok(response),
    };

    match state.library.add_book(&session.user_id, form.into_inner()).await {
        Ok(_) => Ok(redirect("/home")),
        Err(e) => render(&state, Page::NewBook, Some(&form_message(e)?)),
    }
}

pub async fn share(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if let Access::Denied(response) = require_login(&req, &state).await? {
        return Ok(response);
    }
    render(&state, Page::Share, None)
}
