//! Authentication module for Shelfmark
//!
//! Credential handling (signup, login, account changes) and the
//! cookie-backed session gate every protected page goes through.

mod service;
mod session;

pub use service::{hash_password, verify_password, AuthService, SignupRequest};
pub use session::{session_cookie, GateOutcome, SessionGate, SessionStatus, SESSION_COOKIE};
