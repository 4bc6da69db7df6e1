use std::io::{self, BufRead, Write};

use clap::Args;

use crate::cmd::render;
use crate::context::AppContext;
use crate::domain::category::Category;
use crate::domain::filter::{DateFilter, RowSelection};
use crate::domain::lifecycle::{Transition, TransitionKind};
use crate::domain::ticket::{NewTicket, TicketId};
use crate::error::{AppError, AppResult};
use crate::workflow::transition::{find_ticket, propose};
use crate::workflow::{intake, listing, summary};

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Request category (general, hardware, email, transfer).
    pub category: Option<String>,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub department: String,
    #[arg(long)]
    pub description: String,
    #[arg(long, default_value = "")]
    pub request_type: String,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    pub category: Option<String>,
    /// Only show tickets submitted on this day (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<String>,
    /// Highlight one row by ticket id.
    #[arg(long)]
    pub select: Option<i64>,
    /// Ignore cached results.
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ProgressArgs {
    pub category: Option<String>,
    #[arg(long)]
    pub select: Option<i64>,
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TransitionArgs {
    pub category: String,
    pub id: i64,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UnfinishArgs {
    #[command(flatten)]
    pub target: TransitionArgs,
    /// Why the ticket is being marked unfinished.
    #[arg(long)]
    pub reason: String,
}

pub fn resolve_category(ctx: &AppContext, raw: Option<&str>) -> AppResult<Category> {
    match raw {
        Some(raw) => Category::from_str(raw).ok_or_else(|| {
            AppError::Validation(format!(
                "unknown category '{raw}' (expected general, hardware, email or transfer)"
            ))
        }),
        None => ctx.config.default_category.ok_or_else(|| {
            AppError::Validation(
                "no category given and no default category configured".to_string(),
            )
        }),
    }
}

pub async fn submit(ctx: &AppContext, args: SubmitArgs) -> AppResult<()> {
    let category = resolve_category(ctx, args.category.as_deref())?;
    let draft = NewTicket {
        name: args.name,
        department: args.department,
        description: args.description,
        request_type: args.request_type,
    };
    let ticket = intake::submit_request(ctx, category, draft).await?;
    println!("Ticket {} created ({}).", ticket.id, ticket.status);
    Ok(())
}

pub async fn list(ctx: &AppContext, args: ListArgs) -> AppResult<()> {
    let category = resolve_category(ctx, args.category.as_deref())?;
    let filter = args.date.as_deref().map(DateFilter::parse).transpose()?;

    let mut listing = listing::list_all(ctx, category, args.refresh).await?;
    if let Some(filter) = filter {
        listing.apply_filter(filter);
    }
    print!("{}", render::listing(&listing, &selection(args.select)));
    Ok(())
}

pub async fn reset(ctx: &AppContext, category: Option<String>) -> AppResult<()> {
    let category = resolve_category(ctx, category.as_deref())?;
    let listing = listing::reset(ctx, category).await?;
    print!("{}", render::listing(&listing, &RowSelection::default()));
    Ok(())
}

pub async fn progress(ctx: &AppContext, args: ProgressArgs) -> AppResult<()> {
    let category = resolve_category(ctx, args.category.as_deref())?;
    let board = listing::list_progress(ctx, category, args.refresh).await?;
    print!("{}", render::progress(&board, &selection(args.select)));
    Ok(())
}

pub async fn show_summary(ctx: &AppContext, refresh: bool) -> AppResult<()> {
    let summaries = summary::summarize(ctx, refresh).await?;
    print!("{}", render::summary(&summaries));
    Ok(())
}

pub async fn transition(
    ctx: &AppContext,
    args: TransitionArgs,
    kind: TransitionKind,
    reason: Option<&str>,
) -> AppResult<()> {
    let category = resolve_category(ctx, Some(&args.category))?;
    let transition = match kind {
        TransitionKind::Finish => Transition::Finish,
        TransitionKind::Reverse => Transition::Reverse,
        TransitionKind::Unfinish => Transition::unfinish(reason.unwrap_or_default())?,
    };

    // Check the role before spending a request on the lookup.
    if !ctx.session_store.current().is_admin() {
        return Err(AppError::Forbidden(format!("only administrators can {kind} tickets")));
    }
    let ticket = find_ticket(ctx, category, TicketId(args.id)).await?;
    let pending = propose(ctx, category, ticket, transition)?;

    if !args.yes {
        let ticket = pending.ticket();
        println!("{}", pending.title());
        println!(
            "Ticket {} from {} ({}), currently {}",
            ticket.id, ticket.name, ticket.department, ticket.status
        );
        let stdin = io::stdin();
        if !confirm(&pending.prompt(), &mut stdin.lock(), &mut io::stdout())? {
            pending.cancel();
            println!("Cancelled.");
            return Ok(());
        }
    }

    pending.confirm(ctx).await
}

fn selection(select: Option<i64>) -> RowSelection {
    let mut selection = RowSelection::default();
    if let Some(id) = select {
        selection.toggle(TicketId(id));
    }
    selection
}

fn confirm(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> AppResult<bool> {
    write!(output, "{prompt} [y/N]: ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
