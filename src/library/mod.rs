//! A user's shelf: listing and adding books.

use std::sync::Arc;
use tracing::info;

use crate::db::models::{Book, BookDraft};
use crate::db::services::BookService;
use crate::error::ValidationError;
use crate::Result;

pub struct LibraryService {
    books: Arc<dyn BookService>,
}

impl LibraryService {
    pub fn new(books: Arc<dyn BookService>) -> Self {
        Self { books }
    }

    pub async fn shelf(&self, user_id: &str) -> Result<Vec<Book>> {
        self.books.books(user_id).await
    }

    /// Titles must be non-empty and unique (exact match) among the owner's
    /// own books.
    pub async fn add_book(&self, user_id: &str, draft: BookDraft) -> Result<Book> {
        if draft.title.is_empty() {
            return Err(ValidationError::MissingTitle.into());
        }
        let shelf = self.books.books(user_id).await?;
        if shelf.iter().any(|book| book.title == draft.title) {
            return Err(ValidationError::DuplicateTitle.into());
        }

        let book = Book::new(user_id.to_string(), draft);
        self.books.create_book(&book).await?;

        info!("User {} added book {}", user_id, book.id);
        Ok(book)
    }
}
