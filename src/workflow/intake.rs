use tracing::info;

use crate::context::AppContext;
use crate::domain::category::{Category, QueryKey};
use crate::domain::ticket::{NewTicket, Ticket};
use crate::error::AppResult;
use crate::services::{Notice, NoticeLevel};
use crate::workflow::{persist, report_failure};

pub async fn submit_request(
    ctx: &AppContext,
    category: Category,
    draft: NewTicket,
) -> AppResult<Ticket> {
    let draft = draft.validated()?;
    let session = ctx.session_store.current();

    let ticket = ctx
        .ticket_service
        .submit(category, &draft, &session)
        .await
        .map_err(|err| report_failure(ctx, err))?;

    info!(%category, id = %ticket.id, "ticket submitted");
    ctx.with_cache(|cache| {
        cache.invalidate(QueryKey::all(category));
        persist(cache);
    })?;
    ctx.notifier.notify(Notice::new(
        NoticeLevel::Success,
        "Request submitted",
        &format!("Your ticket number is {}", ticket.id),
    ));

    Ok(ticket)
}
