pub mod intake;
pub mod listing;
pub mod summary;
pub mod transition;

use chrono::Utc;
use tracing::{debug, warn};

use crate::cache::QueryCache;
use crate::context::AppContext;
use crate::domain::category::{QueryKey, View};
use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};
use crate::services::Notice;

/// Routes a failed request: 401 ends the session and drops every cached list
/// without an error notice, anything else becomes an error notice.
pub(crate) fn report_failure(ctx: &AppContext, err: AppError) -> AppError {
    match err {
        AppError::Unauthorized => {
            warn!("ticket service rejected the session; logging out");
            if let Err(logout_err) = ctx.session_store.logout() {
                warn!(%logout_err, "failed to clear session");
            }
            if let Err(cache_err) = ctx.with_cache(|cache| {
                cache.clear();
                persist(cache);
            }) {
                warn!(%cache_err, "failed to clear ticket cache");
            }
            AppError::Unauthorized
        }
        err @ (AppError::Service { .. } | AppError::Network(_)) => {
            ctx.notifier.notify(Notice::error(err.notice_text()));
            AppError::Reported
        }
        other => other,
    }
}

/// Read-through fetch: serve a fresh cached list unless `refresh` is set.
///
/// In-progress lists are tied to the session that fetched them; without an
/// authenticated session they always go to the service.
pub(crate) async fn fetch_cached(
    ctx: &AppContext,
    key: QueryKey,
    refresh: bool,
) -> AppResult<Vec<Ticket>> {
    let ttl = ctx.config.cache_ttl;
    let session = ctx.session_store.current();
    let owner = match key.view {
        View::All => None,
        View::Progress => QueryCache::owner_for(&session),
    };
    let cacheable = key.view == View::All || owner.is_some();

    if cacheable && !refresh {
        let cached =
            ctx.with_cache(|cache| cache.get_fresh(key, owner.as_deref(), ttl, Utc::now()))?;
        if let Some(tickets) = cached {
            debug!(key = %key.as_string(), "serving tickets from cache");
            return Ok(tickets);
        }
    }

    let fetched = match key.view {
        View::All => ctx.ticket_service.list_all(key.category, &session).await,
        View::Progress => ctx.ticket_service.list_progress(key.category, &session).await,
    };
    let tickets = fetched.map_err(|err| report_failure(ctx, err))?;

    if cacheable {
        ctx.with_cache(|cache| {
            cache.insert(key, owner, tickets.clone(), Utc::now());
            persist(cache);
        })?;
    }
    Ok(tickets)
}

pub(crate) fn persist(cache: &QueryCache) {
    if let Err(err) = cache.save() {
        warn!(%err, "failed to persist ticket cache");
    }
}
