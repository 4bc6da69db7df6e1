//! Two-phase status changes: `propose` builds a command that names the ticket
//! and the question to ask, `confirm` sends it, `cancel` drops it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::category::{Category, QueryKey};
use crate::domain::lifecycle::{Transition, TransitionKind};
use crate::domain::ticket::{Ticket, TicketId};
use crate::error::{AppError, AppResult};
use crate::services::{Notice, NoticeLevel};
use crate::workflow::{fetch_cached, persist, report_failure};

#[derive(Debug)]
pub struct PendingTransition {
    category: Category,
    ticket: Ticket,
    transition: Transition,
}

impl PendingTransition {
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn kind(&self) -> TransitionKind {
        self.transition.kind()
    }

    pub fn title(&self) -> &'static str {
        self.kind().confirmation_title()
    }

    pub fn prompt(&self) -> String {
        self.kind().confirmation_prompt(&self.ticket.name)
    }

    pub async fn confirm(self, ctx: &AppContext) -> AppResult<()> {
        let session = ctx.session_store.current();
        require_admin(session.is_admin(), self.kind())?;

        let id = self.ticket.id;
        let _guard = InFlightGuard::acquire(ctx.in_flight(), self.category, id)?;

        ctx.ticket_service
            .apply_transition(self.category, id, &self.transition, &session)
            .await
            .map_err(|err| report_failure(ctx, err))?;

        info!(
            category = %self.category,
            %id,
            transition = %self.kind(),
            expected_status = %self.kind().target_status(),
            "ticket transitioned"
        );
        ctx.with_cache(|cache| {
            cache.invalidate(QueryKey::progress(self.category));
            cache.invalidate(QueryKey::all(self.category));
            persist(cache);
        })?;
        ctx.notifier.notify(success_notice(self.kind()));
        Ok(())
    }

    pub fn cancel(self) {
        info!(id = %self.ticket.id, transition = %self.kind(), "transition cancelled");
    }
}

pub fn propose(
    ctx: &AppContext,
    category: Category,
    ticket: Ticket,
    transition: Transition,
) -> AppResult<PendingTransition> {
    let kind = transition.kind();
    require_admin(ctx.session_store.current().is_admin(), kind)?;

    if !kind.expected_from(&ticket.status) {
        warn!(
            id = %ticket.id,
            status = %ticket.status,
            transition = %kind,
            "transition requested from an unexpected status; the service decides"
        );
    }

    Ok(PendingTransition {
        category,
        ticket,
        transition,
    })
}

/// Looks a ticket up in the in-progress list first, then in the full list.
pub async fn find_ticket(ctx: &AppContext, category: Category, id: TicketId) -> AppResult<Ticket> {
    for key in [QueryKey::progress(category), QueryKey::all(category)] {
        let tickets = fetch_cached(ctx, key, false).await?;
        if let Some(ticket) = tickets.into_iter().find(|ticket| ticket.id == id) {
            return Ok(ticket);
        }
    }
    Err(AppError::Validation(format!(
        "ticket {id} was not found in {category} requests"
    )))
}

fn require_admin(is_admin: bool, kind: TransitionKind) -> AppResult<()> {
    if is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "only administrators can {kind} tickets"
        )))
    }
}

fn success_notice(kind: TransitionKind) -> Notice {
    match kind {
        TransitionKind::Finish => Notice::new(
            NoticeLevel::Success,
            "Ticket is now finished",
            "Ticket is now closed",
        ),
        TransitionKind::Reverse => Notice::new(
            NoticeLevel::Success,
            "Ticket has been reversed",
            "Ticket is now back in pending",
        ),
        TransitionKind::Unfinish => Notice::new(
            NoticeLevel::Warning,
            "Ticket is now unfinished",
            "Ticket has been marked as unfinished",
        ),
    }
}

/// Holds a ticket's slot while its transition is outstanding.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<(Category, TicketId)>>>,
    key: (Category, TicketId),
}

impl InFlightGuard {
    fn acquire(
        set: &Arc<Mutex<HashSet<(Category, TicketId)>>>,
        category: Category,
        id: TicketId,
    ) -> AppResult<Self> {
        let mut in_flight = set
            .lock()
            .map_err(|_| AppError::Cache("in-flight lock poisoned".to_string()))?;
        if !in_flight.insert((category, id)) {
            return Err(AppError::Validation(format!(
                "a change to ticket {id} is already in progress"
            )));
        }
        Ok(Self {
            set: set.clone(),
            key: (category, id),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.set.lock() {
            in_flight.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::domain::filter::fixtures::ticket;
    use crate::domain::session::Session;
    use crate::domain::ticket::TicketStatus;
    use crate::services::fakes::FakeFailure;
    use crate::workflow::harness::{admin_session, harness, staff_session};
    use crate::workflow::listing::list_progress;

    const GENERAL: Category = Category::General;

    fn seed_in_progress(h: &crate::workflow::harness::Harness, id: i64) -> Ticket {
        let t = ticket(id, "A", 1, 9, TicketStatus::InProgress);
        h.service.seed(GENERAL, t.clone());
        t
    }

    #[tokio::test]
    async fn finish_removes_ticket_from_progress_list() {
        let h = harness(admin_session());
        let t = seed_in_progress(&h, 7);

        let board = list_progress(&h.ctx, GENERAL, false).await.unwrap();
        assert_eq!(board.tickets.len(), 1);

        let pending = propose(&h.ctx, GENERAL, t, Transition::Finish).unwrap();
        assert_eq!(pending.prompt(), "Are you sure that A's ticket is completed?");
        pending.confirm(&h.ctx).await.unwrap();

        assert_eq!(h.service.status_of(GENERAL, TicketId(7)), Some(TicketStatus::Completed));
        let board = list_progress(&h.ctx, GENERAL, false).await.unwrap();
        assert!(board.tickets.iter().all(|t| t.id != TicketId(7)));
        assert_eq!(h.service.fetch_count(), 2);

        let notices = h.notifier.take();
        assert_eq!(notices, vec![success_notice(TransitionKind::Finish)]);
    }

    #[tokio::test]
    async fn reverse_returns_ticket_to_pending() {
        let h = harness(admin_session());
        let t = seed_in_progress(&h, 3);

        propose(&h.ctx, GENERAL, t, Transition::Reverse)
            .unwrap()
            .confirm(&h.ctx)
            .await
            .unwrap();

        let listing = crate::workflow::listing::list_all(&h.ctx, GENERAL, false)
            .await
            .unwrap();
        let status = &listing.visible()[0].status;
        assert_eq!(*status, TicketStatus::Pending);
    }

    #[tokio::test]
    async fn unfinish_sends_reason_and_warns() {
        let h = harness(admin_session());
        let mut t = seed_in_progress(&h, 4);
        h.service.set_status(GENERAL, t.id, TicketStatus::Completed);
        t.status = TicketStatus::Completed;

        let transition = Transition::unfinish("user still offline").unwrap();
        propose(&h.ctx, GENERAL, t, transition.clone())
            .unwrap()
            .confirm(&h.ctx)
            .await
            .unwrap();

        let sent = h.service.transitions.lock().unwrap().clone();
        assert_eq!(sent, vec![(GENERAL, TicketId(4), transition)]);
        assert_eq!(h.notifier.take()[0].level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn unexpected_source_status_still_sends_transition() {
        let h = harness(admin_session());
        let t = ticket(12, "P", 1, 9, TicketStatus::Pending);
        h.service.seed(GENERAL, t.clone());
        assert!(!TransitionKind::Finish.expected_from(&t.status));

        propose(&h.ctx, GENERAL, t, Transition::Finish)
            .unwrap()
            .confirm(&h.ctx)
            .await
            .unwrap();

        let sent = h.service.transitions.lock().unwrap().clone();
        assert_eq!(sent, vec![(GENERAL, TicketId(12), Transition::Finish)]);
        assert_eq!(h.service.status_of(GENERAL, TicketId(12)), Some(TicketStatus::Completed));
        assert_eq!(h.notifier.take(), vec![success_notice(TransitionKind::Finish)]);
    }

    #[tokio::test]
    async fn non_admin_cannot_propose() {
        let h = harness(staff_session());
        let t = seed_in_progress(&h, 5);

        let err = propose(&h.ctx, GENERAL, t, Transition::Finish).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(h.service.transitions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_sends_nothing() {
        let h = harness(admin_session());
        let t = seed_in_progress(&h, 6);

        propose(&h.ctx, GENERAL, t, Transition::Finish).unwrap().cancel();
        assert!(h.service.transitions.lock().unwrap().is_empty());
        assert_eq!(h.service.status_of(GENERAL, TicketId(6)), Some(TicketStatus::InProgress));
    }

    #[tokio::test]
    async fn unauthorized_transition_logs_out_silently() {
        let h = harness(admin_session());
        let t = seed_in_progress(&h, 8);
        h.service.fail_next(FakeFailure::Unauthorized);

        let err = propose(&h.ctx, GENERAL, t, Transition::Finish)
            .unwrap()
            .confirm(&h.ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized));
        assert_eq!(h.sessions.logouts.load(Ordering::SeqCst), 1);
        assert_eq!(h.ctx.session_store.current(), Session::anonymous());
        assert!(h.notifier.take().is_empty());
    }

    #[tokio::test]
    async fn service_failure_keeps_cache_and_notifies() {
        let h = harness(admin_session());
        let t = seed_in_progress(&h, 9);
        list_progress(&h.ctx, GENERAL, false).await.unwrap();
        h.service
            .fail_next(FakeFailure::Service(409, "ticket already closed".to_string()));

        let err = propose(&h.ctx, GENERAL, t, Transition::Finish)
            .unwrap()
            .confirm(&h.ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Reported));

        let notices = h.notifier.take();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].description, "ticket already closed");

        list_progress(&h.ctx, GENERAL, false).await.unwrap();
        assert_eq!(h.service.fetch_count(), 1);
    }

    #[tokio::test]
    async fn double_confirm_is_rejected_while_in_flight() {
        let h = harness(admin_session());
        let t = seed_in_progress(&h, 10);
        let release = h.service.hold_transitions();

        let first = propose(&h.ctx, GENERAL, t.clone(), Transition::Finish).unwrap();
        let second = propose(&h.ctx, GENERAL, t, Transition::Finish).unwrap();

        let ctx = h.ctx.clone();
        let running = tokio::spawn(async move { first.confirm(&ctx).await });
        while !h.ctx.in_flight().lock().unwrap().contains(&(GENERAL, TicketId(10))) {
            tokio::task::yield_now().await;
        }

        let err = second.confirm(&h.ctx).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        release.notify_one();
        running.await.unwrap().unwrap();
        assert_eq!(h.service.transitions.lock().unwrap().len(), 1);
        assert!(h.ctx.in_flight().lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_ticket_falls_back_to_full_list() {
        let h = harness(admin_session());
        h.service
            .seed(GENERAL, ticket(11, "Z", 2, 9, TicketStatus::Completed));

        let found = find_ticket(&h.ctx, GENERAL, TicketId(11)).await.unwrap();
        assert_eq!(found.name, "Z");

        let err = find_ticket(&h.ctx, GENERAL, TicketId(99)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
