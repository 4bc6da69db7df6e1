use crate::domain::session::Session;
use crate::error::AppResult;

/// Source of the current session and the logout action.
pub trait SessionStore: Send + Sync {
    fn current(&self) -> Session;
    fn save(&self, session: &Session) -> AppResult<()>;
    fn logout(&self) -> AppResult<()>;
}
