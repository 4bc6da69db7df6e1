use async_trait::async_trait;

use crate::domain::category::Category;
use crate::domain::lifecycle::Transition;
use crate::domain::session::Session;
use crate::domain::ticket::{NewTicket, Ticket, TicketId};
use crate::error::AppResult;

/// The remote help-desk backend. Implementations report HTTP 401 as
/// `AppError::Unauthorized` and every other non-success reply as `AppError::Service`.
#[async_trait]
pub trait TicketService: Send + Sync {
    async fn submit(&self, category: Category, ticket: &NewTicket, session: &Session)
    -> AppResult<Ticket>;

    async fn list_all(&self, category: Category, session: &Session) -> AppResult<Vec<Ticket>>;

    async fn list_progress(&self, category: Category, session: &Session)
    -> AppResult<Vec<Ticket>>;

    async fn apply_transition(
        &self,
        category: Category,
        id: TicketId,
        transition: &Transition,
        session: &Session,
    ) -> AppResult<()>;
}
