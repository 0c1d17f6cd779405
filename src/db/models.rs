use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// RFC 1123 with the zone pinned to GMT, e.g. `Mon, 02 Jan 2006 15:04:05 GMT`.
pub const SESSION_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub fn format_session_time(at: DateTime<Utc>) -> String {
    at.format(SESSION_TIME_FORMAT).to_string()
}

pub fn parse_session_time(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, SESSION_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub uname: String,
    pub email: String,
    /// bcrypt hash
    #[serde(skip_serializing)]
    pub password: String,
}

impl User {
    pub fn new(uname: String, email: String, password_hash: String) -> Self {
        Self {
            id: new_id(),
            uname,
            email,
            password: password_hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: String,
    #[sqlx(rename = "userid")]
    pub user_id: String,
    pub title: String,
    pub author: String,
    pub year: String,
    pub genre: String,
    pub notes: String,
}

/// Form input for a book, before it has an id or an owner.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: String,
    pub genre: String,
    pub notes: String,
}

impl Book {
    pub fn new(user_id: String, draft: BookDraft) -> Self {
        Self {
            id: new_id(),
            user_id,
            title: draft.title,
            author: draft.author,
            year: draft.year,
            genre: draft.genre,
            notes: draft.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Also the value of the `session` cookie.
    pub id: String,
    #[sqlx(rename = "userid")]
    pub user_id: String,
    /// Last activity, see [`SESSION_TIME_FORMAT`].
    pub time: String,
}

impl Session {
    pub fn new(user_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            user_id,
            time: format_session_time(now),
        }
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        parse_session_time(&self.time)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.time = format_session_time(now);
    }
}
