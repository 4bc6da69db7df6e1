use std::collections::BTreeMap;

use crate::context::AppContext;
use crate::domain::category::{Category, QueryKey};
use crate::error::{AppError, AppResult};
use crate::workflow::fetch_cached;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: Category,
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
}

/// Per-category status counts. Categories whose fetch failed are left out
/// (their failure has already been reported); an expired session aborts.
pub async fn summarize(ctx: &AppContext, refresh: bool) -> AppResult<Vec<CategorySummary>> {
    let mut summaries = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let tickets = match fetch_cached(ctx, QueryKey::all(category), refresh).await {
            Ok(tickets) => tickets,
            Err(AppError::Reported) => continue,
            Err(err) => return Err(err),
        };

        let mut by_status = BTreeMap::new();
        for ticket in &tickets {
            *by_status.entry(ticket.status.as_str().to_string()).or_insert(0) += 1;
        }
        summaries.push(CategorySummary {
            category,
            total: tickets.len(),
            by_status,
        });
    }
    Ok(summaries)
}
