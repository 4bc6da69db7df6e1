use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::cache::QueryCache;
use crate::config::AppConfig;
use crate::domain::category::Category;
use crate::domain::ticket::TicketId;
use crate::error::{AppError, AppResult};
use crate::services::{Notifier, SessionStore, TicketService};

/// Everything a workflow needs, passed explicitly instead of living in globals.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub ticket_service: Arc<dyn TicketService>,
    pub session_store: Arc<dyn SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    cache: Arc<Mutex<QueryCache>>,
    in_flight: Arc<Mutex<HashSet<(Category, TicketId)>>>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        ticket_service: Arc<dyn TicketService>,
        session_store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        cache: QueryCache,
    ) -> Self {
        Self {
            config,
            ticket_service,
            session_store,
            notifier,
            cache: Arc::new(Mutex::new(cache)),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_cache<R>(&self, f: impl FnOnce(&mut QueryCache) -> R) -> AppResult<R> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| AppError::Cache("cache lock poisoned".to_string()))?;
        Ok(f(&mut cache))
    }

    pub(crate) fn in_flight(&self) -> &Arc<Mutex<HashSet<(Category, TicketId)>>> {
        &self.in_flight
    }
}
