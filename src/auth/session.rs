use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::models::Session;
use crate::db::services::SessionService;
use crate::error::OptionalExt;
use crate::Result;

pub const SESSION_COOKIE: &str = "session";

/// What the store says about a session id, without touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Active(Session),
    Expired(Session),
    Missing,
    /// Stored timestamp does not parse.
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    LoggedIn(Session),
    LoggedOut { clear_cookie: bool },
}

impl GateOutcome {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, GateOutcome::LoggedIn(_))
    }

    pub fn clear_cookie(&self) -> bool {
        matches!(self, GateOutcome::LoggedOut { clear_cookie: true })
    }

    pub fn into_session(self) -> Option<Session> {
        match self {
            GateOutcome::LoggedIn(session) => Some(session),
            GateOutcome::LoggedOut { .. } => None,
        }
    }
}

/// Sliding-expiration session gate. Every protected request goes through
/// [`SessionGate::authenticate`], which renews the session it accepts.
#[derive(Clone)]
pub struct SessionGate {
    sessions: Arc<dyn SessionService>,
    idle_timeout: Duration,
    secure_cookie: bool,
}

impl SessionGate {
    pub fn new(sessions: Arc<dyn SessionService>, idle_timeout: Duration, secure_cookie: bool) -> Self {
        Self {
            sessions,
            idle_timeout,
            secure_cookie,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Read-only lookup. Expired means strictly more than the idle timeout
    /// has passed since the last activity.
    pub async fn check(&self, session_id: &str, now: DateTime<Utc>) -> Result<SessionStatus> {
        let session = match self.sessions.session(session_id).await.optional()? {
            Some(session) => session,
            None => return Ok(SessionStatus::Missing),
        };

        let Some(last_activity) = session.last_activity() else {
            warn!("Session {} has an unreadable timestamp: {:?}", session.id, session.time);
            return Ok(SessionStatus::Malformed);
        };

        if now - last_activity > self.idle_timeout {
            Ok(SessionStatus::Expired(session))
        } else {
            Ok(SessionStatus::Active(session))
        }
    }

    pub async fn renew(&self, mut session: Session, now: DateTime<Utc>) -> Result<Session> {
        session.touch(now);
        self.sessions.update_session(&session).await?;
        debug!("Renewed session {}", session.id);
        Ok(session)
    }

    pub async fn expire(&self, session: &Session) -> Result<()> {
        self.sessions.delete_session(&session.id).await?;
        info!("Session {} for user {} expired", session.id, session.user_id);
        Ok(())
    }

    /// Check, then renew or expire. Absent cookie, unknown id and unreadable
    /// timestamps all count as logged out.
    pub async fn authenticate(&self, cookie: Option<&str>, now: DateTime<Utc>) -> Result<GateOutcome> {
        let Some(session_id) = cookie else {
            return Ok(GateOutcome::LoggedOut { clear_cookie: false });
        };

        match self.check(session_id, now).await? {
            SessionStatus::Active(session) => {
                let session = self.renew(session, now).await?;
                Ok(GateOutcome::LoggedIn(session))
            }
            SessionStatus::Expired(session) => {
                self.expire(&session).await?;
                Ok(GateOutcome::LoggedOut { clear_cookie: true })
            }
            SessionStatus::Missing | SessionStatus::Malformed => {
                Ok(GateOutcome::LoggedOut { clear_cookie: false })
            }
        }
    }

    pub async fn is_logged_in(&self, cookie: Option<&str>, now: DateTime<Utc>) -> Result<bool> {
        Ok(self.authenticate(cookie, now).await?.is_logged_in())
    }

    pub fn cookie(&self, session: &Session) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, session.id.clone())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .finish()
    }

    /// Cookie that tells the browser to forget the session id.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .finish();
        cookie.make_removal();
        cookie
    }
}

pub fn session_cookie(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE).map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::services::MockSessionService;
    use crate::error::{AppError, DatabaseError};
    use chrono::TimeZone;

    const SESSION_ID: &str = "0b6f3d1e-8f5a-4f6c-9a57-3c1b2d4e5f60";
    const USER_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, 0).unwrap()
    }

    fn stored_session() -> Session {
        let mut session = Session::new(USER_ID.to_string(), start());
        session.id = SESSION_ID.to_string();
        session
    }

    fn gate(mock: MockSessionService) -> SessionGate {
        SessionGate::new(Arc::new(mock), Duration::seconds(300), false)
    }

    fn returning_stored(mock: &mut MockSessionService) {
        mock.expect_session()
            .withf(|id| id == SESSION_ID)
            .returning(|_| Ok(stored_session()));
    }

    #[test_log::test(tokio::test)]
    async fn test_no_cookie_is_logged_out_without_lookup() {
        let mut mock = MockSessionService::new();
        mock.expect_session().never();

        let outcome = gate(mock).authenticate(None, start()).await.unwrap();
        assert_eq!(outcome, GateOutcome::LoggedOut { clear_cookie: false });
    }

    #[tokio::test]
    async fn test_unknown_session_is_logged_out() {
        let mut mock = MockSessionService::new();
        mock.expect_session()
            .returning(|_| Err(DatabaseError::NotFound.into()));
        mock.expect_delete_session().never();
        mock.expect_update_session().never();

        let logged_in = gate(mock).is_logged_in(Some("nope"), start()).await.unwrap();
        assert!(!logged_in);
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_swallowed() {
        let mut mock = MockSessionService::new();
        mock.expect_session()
            .returning(|_| Err(DatabaseError::Query("connection reset".into()).into()));

        let result = gate(mock).authenticate(Some(SESSION_ID), start()).await;
        assert!(matches!(result, Err(AppError::Database(DatabaseError::Query(_)))));
    }

    #[tokio::test]
    async fn test_active_session_is_renewed() {
        let now = start() + Duration::seconds(299);
        let mut mock = MockSessionService::new();
        returning_stored(&mut mock);
        mock.expect_update_session()
            .withf(move |s| s.id == SESSION_ID && s.last_activity() == Some(now))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_delete_session().never();

        let outcome = gate(mock).authenticate(Some(SESSION_ID), now).await.unwrap();
        let session = outcome.into_session().expect("should be logged in");
        assert_eq!(session.user_id, USER_ID);
        assert_eq!(session.last_activity(), Some(now));
    }

    #[tokio::test]
    async fn test_exactly_at_timeout_is_still_valid() {
        let now = start() + Duration::seconds(300);
        let mut mock = MockSessionService::new();
        returning_stored(&mut mock);
        mock.expect_update_session().times(1).returning(|_| Ok(()));

        assert!(gate(mock).is_logged_in(Some(SESSION_ID), now).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_session_is_deleted() {
        let now = start() + Duration::seconds(301);
        let mut mock = MockSessionService::new();
        returning_stored(&mut mock);
        mock.expect_delete_session()
            .withf(|id| id == SESSION_ID)
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_update_session().never();

        let outcome = gate(mock).authenticate(Some(SESSION_ID), now).await.unwrap();
        assert_eq!(outcome, GateOutcome::LoggedOut { clear_cookie: true });
        assert!(outcome.clear_cookie());
    }

    #[tokio::test]
    async fn test_malformed_timestamp_is_logged_out() {
        let mut mock = MockSessionService::new();
        mock.expect_session().returning(|_| {
            let mut session = stored_session();
            session.time = "yesterday".into();
            Ok(session)
        });
        mock.expect_update_session().never();
        mock.expect_delete_session().never();

        let status = gate(mock).check(SESSION_ID, start()).await.unwrap();
        assert_eq!(status, SessionStatus::Malformed);
    }

    #[tokio::test]
    async fn test_check_does_not_write() {
        let mut mock = MockSessionService::new();
        returning_stored(&mut mock);
        mock.expect_update_session().never();
        mock.expect_delete_session().never();
        let gate = gate(mock);

        let status = gate.check(SESSION_ID, start() + Duration::seconds(10)).await.unwrap();
        assert!(matches!(status, SessionStatus::Active(_)));

        let status = gate.check(SESSION_ID, start() + Duration::seconds(1000)).await.unwrap();
        assert!(matches!(status, SessionStatus::Expired(_)));
    }

    #[test]
    fn test_cookies() {
        let gate = gate(MockSessionService::new());
        let cookie = gate.cookie(&stored_session());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), SESSION_ID);
        assert_eq!(cookie.http_only(), Some(true));

        let removal = gate.removal_cookie();
        assert_eq!(removal.name(), SESSION_COOKIE);
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
    }
}
