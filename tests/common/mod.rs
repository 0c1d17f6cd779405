#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use shelfmark::db::models::{format_session_time, Book, Session, User};
use shelfmark::error::DatabaseError;
use shelfmark::{AppState, BookService, Result, SessionService, Settings, UserService};
use std::sync::{Arc, Mutex};

/// Vec-backed stand-in for Postgres. Lookups that miss fail with NotFound,
/// like the real queries do.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    books: Mutex<Vec<Book>>,
    sessions: Mutex<Vec<Session>>,
}

impl MemoryStore {
    pub fn users_snapshot(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn books_snapshot(&self) -> Vec<Book> {
        self.books.lock().unwrap().clone()
    }

    pub fn sessions_snapshot(&self) -> Vec<Session> {
        self.sessions.lock().unwrap().clone()
    }

    /// Moves a session's last activity `seconds` into the past.
    pub fn backdate_session(&self, id: &str, seconds: i64) {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.iter_mut().find(|s| s.id == id).expect("unknown session");
        session.time = format_session_time(Utc::now() - Duration::seconds(seconds));
    }
}

fn not_found<T>() -> Result<T> {
    Err(DatabaseError::NotFound.into())
}

#[async_trait]
impl UserService for MemoryStore {
    async fn user(&self, id: &str) -> Result<User> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.id == id).cloned().map_or_else(not_found, Ok)
    }

    async fn users(&self) -> Result<Vec<User>> {
        Ok(self.users_snapshot())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        for stored in users.iter_mut().filter(|u| u.id == user.id) {
            *stored = user.clone();
        }
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }

    async fn user_from_email(&self, email: &str) -> Result<User> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.email == email).cloned().map_or_else(not_found, Ok)
    }
}

#[async_trait]
impl BookService for MemoryStore {
    async fn book(&self, id: &str) -> Result<Book> {
        let books = self.books.lock().unwrap();
        books.iter().find(|b| b.id == id).cloned().map_or_else(not_found, Ok)
    }

    async fn books(&self, user_id: &str) -> Result<Vec<Book>> {
        let books = self.books.lock().unwrap();
        Ok(books.iter().filter(|b| b.user_id == user_id).cloned().collect())
    }

    async fn create_book(&self, book: &Book) -> Result<()> {
        self.books.lock().unwrap().push(book.clone());
        Ok(())
    }

    async fn update_book(&self, book: &Book) -> Result<()> {
        let mut books = self.books.lock().unwrap();
        for stored in books.iter_mut().filter(|b| b.id == book.id) {
            *stored = book.clone();
        }
        Ok(())
    }

    async fn delete_book(&self, id: &str) -> Result<()> {
        self.books.lock().unwrap().retain(|b| b.id != id);
        Ok(())
    }
}

#[async_trait]
impl SessionService for MemoryStore {
    async fn session(&self, id: &str) -> Result<Session> {
        let sessions = self.sessions.lock().unwrap();
        sessions.iter().find(|s| s.id == id).cloned().map_or_else(not_found, Ok)
    }

    async fn sessions(&self) -> Result<Vec<Session>> {
        Ok(self.sessions_snapshot())
    }

    async fn create_session(&self, session: &Session) -> Result<()> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn update_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.lock().unwrap();
        for stored in sessions.iter_mut().filter(|s| s.id == session.id) {
            *stored = session.clone();
        }
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<()> {
        self.sessions.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }
}

pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let config = Settings::new_for_test().expect("Failed to load test config");
    let store = Arc::new(MemoryStore::default());
    let state = AppState::with_store(config, store.clone()).expect("Failed to build app state");
    (state, store)
}

pub fn session_cookie_of<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(|c| c.into_owned())
}

pub fn location_of<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
