//! Database module for Shelfmark
//!
//! Records, the storage traits the rest of the crate depends on, and the
//! Postgres implementation behind them.

pub mod models;
pub mod operations;
pub mod services;

pub use models::{Book, BookDraft, Session, User};
pub use operations::DbOperations;
pub use services::{BookService, SessionService, UserService};
