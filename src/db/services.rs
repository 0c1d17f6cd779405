//! Storage capabilities, one trait per table.
//!
//! Fetch-by-id style lookups fail with [`DatabaseError::NotFound`] when no
//! row matches; use [`OptionalExt::optional`] where absence is expected.
//! Writes hand back the storage error untouched.
//!
//! [`DatabaseError::NotFound`]: crate::error::DatabaseError::NotFound
//! [`OptionalExt::optional`]: crate::error::OptionalExt::optional

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::db::models::{Book, Session, User};
use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn user(&self, id: &str) -> Result<User>;
    async fn users(&self) -> Result<Vec<User>>;
    async fn create_user(&self, user: &User) -> Result<()>;
    async fn update_user(&self, user: &User) -> Result<()>;
    async fn delete_user(&self, id: &str) -> Result<()>;
    /// Login key lookup.
    async fn user_from_email(&self, email: &str) -> Result<User>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookService: Send + Sync {
    async fn book(&self, id: &str) -> Result<Book>;
    /// Books owned by `user_id`.
    async fn books(&self, user_id: &str) -> Result<Vec<Book>>;
    async fn create_book(&self, book: &Book) -> Result<()>;
    async fn update_book(&self, book: &Book) -> Result<()>;
    async fn delete_book(&self, id: &str) -> Result<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn session(&self, id: &str) -> Result<Session>;
    async fn sessions(&self) -> Result<Vec<Session>>;
    async fn create_session(&self, session: &Session) -> Result<()>;
    async fn update_session(&self, session: &Session) -> Result<()>;
    async fn delete_session(&self, id: &str) -> Result<()>;
}
