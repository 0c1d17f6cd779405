use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::db::models::{Book, Session, User};
use crate::db::services::{BookService, SessionService, UserService};
use crate::error::DatabaseError;
use crate::Result;

/// Postgres-backed implementation of every storage trait.
#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }

    /// Creates missing tables. With `reset_sessions` the session table is
    /// dropped first, so every existing login is invalidated.
    pub async fn init_schema(&self, reset_sessions: bool) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS "user" (id VARCHAR(64), uname TEXT, email TEXT, password VARCHAR(64))"#,
        )
        .execute(self.pool())
        .await?;

        if reset_sessions {
            warn!("Dropping session table, all existing sessions are invalidated");
            sqlx::query("DROP TABLE IF EXISTS session")
                .execute(self.pool())
                .await?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS session (id VARCHAR(64), userid VARCHAR(64), time VARCHAR(64))",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS book (id VARCHAR(64), userid VARCHAR(64), title TEXT, author TEXT, year TEXT, genre TEXT, notes TEXT)",
        )
        .execute(self.pool())
        .await?;

        info!("Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl UserService for DbOperations {
    async fn user(&self, id: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, uname, email, password FROM "user" WHERE id = $1"#,
        )
        .bind(id)
        .fetch_one(self.pool())
        .await?;

        Ok(user)
    }

    async fn users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(r#"SELECT id, uname, email, password FROM "user""#)
            .fetch_all(self.pool())
            .await?;

        Ok(users)
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(r#"INSERT INTO "user" (id, uname, email, password) VALUES ($1, $2, $3, $4)"#)
            .bind(&user.id)
            .bind(&user.uname)
            .bind(&user.email)
            .bind(&user.password)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        sqlx::query(r#"UPDATE "user" SET uname = $1, email = $2, password = $3 WHERE id = $4"#)
            .bind(&user.uname)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    async fn user_from_email(&self, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, uname, email, password FROM "user" WHERE email = $1"#,
        )
        .bind(email)
        .fetch_one(self.pool())
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl BookService for DbOperations {
    async fn book(&self, id: &str) -> Result<Book> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, userid, title, author, year, genre, notes FROM book WHERE id = $1",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await?;

        Ok(book)
    }

    async fn books(&self, user_id: &str) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, userid, title, author, year, genre, notes FROM book WHERE userid = $1",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(books)
    }

    async fn create_book(&self, book: &Book) -> Result<()> {
        sqlx::query(
            "INSERT INTO book (id, userid, title, author, year, genre, notes) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&book.id)
        .bind(&book.user_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.year)
        .bind(&book.genre)
        .bind(&book.notes)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn update_book(&self, book: &Book) -> Result<()> {
        sqlx::query(
            "UPDATE book SET userid = $1, title = $2, author = $3, year = $4, genre = $5, notes = $6 WHERE id = $7",
        )
        .bind(&book.user_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.year)
        .bind(&book.genre)
        .bind(&book.notes)
        .bind(&book.id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn delete_book(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM book WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SessionService for DbOperations {
    async fn session(&self, id: &str) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, userid, time FROM session WHERE id = $1",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await?;

        Ok(session)
    }

    async fn sessions(&self) -> Result<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>("SELECT id, userid, time FROM session")
            .fetch_all(self.pool())
            .await?;

        Ok(sessions)
    }

    async fn create_session(&self, session: &Session) -> Result<()> {
        sqlx::query("INSERT INTO session (id, userid, time) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(&session.user_id)
            .bind(&session.time)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    async fn update_session(&self, session: &Session) -> Result<()> {
        sqlx::query("UPDATE session SET userid = $1, time = $2 WHERE id = $3")
            .bind(&session.user_id)
            .bind(&session.time)
            .bind(&session.id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM session WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }
}
