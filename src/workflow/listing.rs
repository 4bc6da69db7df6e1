use tracing::info;

use crate::context::AppContext;
use crate::domain::category::{Category, QueryKey};
use crate::domain::filter::DateFilter;
use crate::domain::lifecycle::TransitionKind;
use crate::domain::ticket::Ticket;
use crate::error::AppResult;
use crate::workflow::{fetch_cached, persist};

/// The full ticket set for a category, optionally narrowed by date.
#[derive(Debug, Clone)]
pub struct TicketListing {
    pub category: Category,
    tickets: Vec<Ticket>,
    filter: Option<DateFilter>,
}

impl TicketListing {
    pub fn new(category: Category, tickets: Vec<Ticket>) -> Self {
        Self {
            category,
            tickets,
            filter: None,
        }
    }

    pub fn apply_filter(&mut self, filter: DateFilter) {
        self.filter = Some(filter);
    }

    pub fn filter(&self) -> Option<DateFilter> {
        self.filter
    }

    pub fn visible(&self) -> Vec<&Ticket> {
        match &self.filter {
            Some(filter) => filter.apply(&self.tickets),
            None => self.tickets.iter().collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.tickets.len()
    }
}

pub async fn list_all(
    ctx: &AppContext,
    category: Category,
    refresh: bool,
) -> AppResult<TicketListing> {
    let tickets = fetch_cached(ctx, QueryKey::all(category), refresh).await?;
    Ok(TicketListing::new(category, tickets))
}

/// Drops the cached full list and fetches it again, unfiltered.
pub async fn reset(ctx: &AppContext, category: Category) -> AppResult<TicketListing> {
    ctx.with_cache(|cache| {
        cache.invalidate(QueryKey::all(category));
        persist(cache);
    })?;
    info!(%category, "ticket list reset");
    list_all(ctx, category, false).await
}

/// In-progress tickets plus the actions the current session may take on them.
#[derive(Debug, Clone)]
pub struct ProgressBoard {
    pub category: Category,
    pub tickets: Vec<Ticket>,
    pub actions: Vec<TransitionKind>,
}

pub async fn list_progress(
    ctx: &AppContext,
    category: Category,
    refresh: bool,
) -> AppResult<ProgressBoard> {
    let tickets = fetch_cached(ctx, QueryKey::progress(category), refresh).await?;
    let actions = if ctx.session_store.current().is_admin() {
        TransitionKind::ALL.to_vec()
    } else {
        Vec::new()
    };
    Ok(ProgressBoard {
        category,
        tickets,
        actions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::fixtures::ticket;
    use crate::domain::ticket::TicketStatus;
    use crate::workflow::harness::{admin_session, harness, staff_session};

    fn seed_two_days(h: &crate::workflow::harness::Harness) {
        h.service
            .seed(Category::General, ticket(1, "A", 1, 9, TicketStatus::Pending));
        h.service
            .seed(Category::General, ticket(2, "B", 1, 17, TicketStatus::InProgress));
        h.service
            .seed(Category::General, ticket(3, "C", 2, 8, TicketStatus::Completed));
    }

    #[tokio::test]
    async fn date_filter_then_reset_restores_full_set() {
        let h = harness(admin_session());
        seed_two_days(&h);

        let mut listing = list_all(&h.ctx, Category::General, false).await.unwrap();
        listing.apply_filter(DateFilter::parse("2024-03-01").unwrap());
        let ids: Vec<_> = listing.visible().iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(listing.total(), 3);

        let listing = reset(&h.ctx, Category::General).await.unwrap();
        assert_eq!(listing.filter(), None);
        assert_eq!(listing.visible().len(), 3);
        assert_eq!(h.service.fetch_count(), 2);
    }

    #[tokio::test]
    async fn progress_lists_only_in_progress_tickets() {
        let h = harness(admin_session());
        seed_two_days(&h);

        let board = list_progress(&h.ctx, Category::General, false).await.unwrap();
        let ids: Vec<_> = board.tickets.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(board.actions, TransitionKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn non_admin_board_has_no_actions() {
        let h = harness(staff_session());
        seed_two_days(&h);

        let board = list_progress(&h.ctx, Category::General, false).await.unwrap();
        assert_eq!(board.tickets.len(), 1);
        assert!(board.actions.is_empty());
    }
}
