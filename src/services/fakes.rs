//! In-memory stand-ins for the remote service, the session store and the notifier.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use crate::domain::category::Category;
use crate::domain::lifecycle::Transition;
use crate::domain::session::Session;
use crate::domain::ticket::{NewTicket, Ticket, TicketId, TicketStatus};
use crate::error::{AppError, AppResult};
use crate::services::{Notice, Notifier, SessionStore, TicketService};

#[derive(Debug, Clone)]
pub enum FakeFailure {
    Unauthorized,
    Service(u16, String),
    Network,
}

impl FakeFailure {
    fn into_error(self) -> AppError {
        match self {
            FakeFailure::Unauthorized => AppError::Unauthorized,
            FakeFailure::Service(status, message) => AppError::Service { status, message },
            FakeFailure::Network => AppError::Network("connection refused".to_string()),
        }
    }
}

#[derive(Default)]
pub struct FakeTicketService {
    tickets: Mutex<BTreeMap<(Category, TicketId), Ticket>>,
    next_id: Mutex<i64>,
    failure: Mutex<Option<FakeFailure>>,
    pub fetches: AtomicUsize,
    pub transitions: Mutex<Vec<(Category, TicketId, Transition)>>,
    hold_transitions: Mutex<Option<std::sync::Arc<Notify>>>,
}

impl FakeTicketService {
    pub fn with_next_id(next_id: i64) -> Self {
        let service = Self::default();
        *service.next_id.lock().unwrap() = next_id;
        service
    }

    pub fn seed(&self, category: Category, ticket: Ticket) {
        self.tickets
            .lock()
            .unwrap()
            .insert((category, ticket.id), ticket);
    }

    pub fn set_status(&self, category: Category, id: TicketId, status: TicketStatus) {
        if let Some(ticket) = self.tickets.lock().unwrap().get_mut(&(category, id)) {
            ticket.status = status;
        }
    }

    pub fn status_of(&self, category: Category, id: TicketId) -> Option<TicketStatus> {
        self.tickets
            .lock()
            .unwrap()
            .get(&(category, id))
            .map(|ticket| ticket.status.clone())
    }

    pub fn fail_next(&self, failure: FakeFailure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    /// Blocks every transition until the returned handle is notified.
    pub fn hold_transitions(&self) -> std::sync::Arc<Notify> {
        let notify = std::sync::Arc::new(Notify::new());
        *self.hold_transitions.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> AppResult<()> {
        match self.failure.lock().unwrap().take() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn list(&self, category: Category, keep: impl Fn(&Ticket) -> bool) -> Vec<Ticket> {
        self.tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|((cat, _), ticket)| *cat == category && keep(ticket))
            .map(|(_, ticket)| ticket.clone())
            .collect()
    }
}

#[async_trait]
impl TicketService for FakeTicketService {
    async fn submit(
        &self,
        category: Category,
        ticket: &NewTicket,
        _session: &Session,
    ) -> AppResult<Ticket> {
        self.take_failure()?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            TicketId(*next - 1)
        };
        let created = Ticket {
            id,
            name: ticket.name.clone(),
            department: ticket.department.clone(),
            description: ticket.description.clone(),
            request_type: ticket.request_type.clone(),
            date: Utc::now(),
            action_date: None,
            status: TicketStatus::Pending,
            it_officer: None,
        };
        self.seed(category, created.clone());
        Ok(created)
    }

    async fn list_all(&self, category: Category, _session: &Session) -> AppResult<Vec<Ticket>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        Ok(self.list(category, |_| true))
    }

    async fn list_progress(
        &self,
        category: Category,
        session: &Session,
    ) -> AppResult<Vec<Ticket>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        if !session.is_authenticated() {
            return Err(AppError::Unauthorized);
        }
        Ok(self.list(category, |ticket| ticket.status == TicketStatus::InProgress))
    }

    async fn apply_transition(
        &self,
        category: Category,
        id: TicketId,
        transition: &Transition,
        session: &Session,
    ) -> AppResult<()> {
        let hold = self.hold_transitions.lock().unwrap().clone();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        self.take_failure()?;
        if !session.is_authenticated() {
            return Err(AppError::Unauthorized);
        }
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets.get_mut(&(category, id)).ok_or(AppError::Service {
            status: 404,
            message: format!("ticket {id} not found"),
        })?;
        ticket.status = transition.kind().target_status();
        ticket.action_date = Some(Utc::now());
        self.transitions
            .lock()
            .unwrap()
            .push((category, id, transition.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Session>,
    pub logouts: AtomicUsize,
}

impl MemorySessionStore {
    pub fn with(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
            logouts: AtomicUsize::new(0),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn current(&self) -> Session {
        self.session.lock().unwrap().clone()
    }

    fn save(&self, session: &Session) -> AppResult<()> {
        *self.session.lock().unwrap() = session.clone();
        Ok(())
    }

    fn logout(&self) -> AppResult<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = Session::anonymous();
        Ok(())
    }
}
