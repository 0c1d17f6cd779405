//! HTTP handlers, one per route. Each one passes through the session gate
//! before doing anything else.

pub mod account;
pub mod auth;
pub mod books;

use actix_web::http::header::{self, ContentType};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::auth::{session_cookie, GateOutcome};
use crate::db::models::Session;
use crate::error::AppError;
use crate::templates::Page;
use crate::{AppState, Result};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(auth::index))
        .route("/home", web::get().to(books::home))
        .route("/book", web::get().to(books::book))
        .route("/newbook", web::get().to(books::new_book))
        .route("/savebook", web::post().to(books::save_book))
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_page))
                .route(web::post().to(auth::login)),
        )
        .route("/logout", web::route().to(auth::logout))
        .service(
            web::resource("/signup")
                .route(web::get().to(auth::signup_page))
                .route(web::post().to(auth::signup)),
        )
        .route("/user", web::get().to(account::user))
        .route("/updatepassword", web::post().to(account::update_password))
        .route("/updateemail", web::post().to(account::update_email))
        .route("/share", web::get().to(books::share))
        .route("/favicon.ico", web::route().to(not_found))
        .route("/health", web::get().to(crate::health_check));
}

pub(crate) async fn gate(req: &HttpRequest, state: &AppState) -> Result<GateOutcome> {
    let cookie = session_cookie(req);
    state.gate.authenticate(cookie.as_deref(), Utc::now()).await
}

/// Either the caller's session, or the redirect to send them away with.
pub(crate) enum Access {
    Granted(Session),
    Denied(HttpResponse),
}

pub(crate) async fn require_login(req: &HttpRequest, state: &AppState) -> Result<Access> {
    let outcome = gate(req, state).await?;
    let clear_cookie = outcome.clear_cookie();
    match outcome.into_session() {
        Some(session) => Ok(Access::Granted(session)),
        None => Ok(Access::Denied(redirect_clearing(state, "/", clear_cookie))),
    }
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Redirect that also drops the session cookie when `clear_cookie` is set.
pub(crate) fn redirect_clearing(state: &AppState, location: &str, clear_cookie: bool) -> HttpResponse {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location));
    if clear_cookie {
        builder.cookie(state.gate.removal_cookie());
    }
    builder.finish()
}

pub(crate) fn render(state: &AppState, page: Page, message: Option<&str>) -> Result<HttpResponse> {
    render_clearing(state, page, message, false)
}

pub(crate) fn render_clearing(
    state: &AppState,
    page: Page,
    message: Option<&str>,
    clear_cookie: bool,
) -> Result<HttpResponse> {
    let body = state.templates.render(page, message)?;
    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    if clear_cookie {
        builder.cookie(state.gate.removal_cookie());
    }
    Ok(builder.body(body))
}

/// Credential and form failures become a message on the page; anything
/// else stays an error.
pub(crate) fn form_message(err: AppError) -> Result<String> {
    match err {
        AppError::Auth(e) => Ok(e.to_string()),
        AppError::Validation(e) => Ok(e.to_string()),
        other => Err(other),
    }
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().finish()
}
