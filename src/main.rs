mod cache;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cache::QueryCache;
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::session::{self as session_cmd, SessionArgs};
use crate::cmd::ticket::{
    self as ticket_cmd, ListArgs, ProgressArgs, SubmitArgs, TransitionArgs, UnfinishArgs,
};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::lifecycle::TransitionKind;
use crate::error::{AppError, AppResult};
use crate::infra::console::ConsoleNotifier;
use crate::infra::http::HttpTicketClient;
use crate::infra::session_file::FileSessionStore;

#[derive(Parser)]
#[command(name = "helpdesk", author, version, about = "IT help-desk ticket client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Ticket(TicketCommand),
    /// Manage the stored admin session.
    Session(SessionArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

/// Commands that talk to the ticket service.
#[derive(Subcommand)]
enum TicketCommand {
    /// Submit a new request.
    Submit(SubmitArgs),
    /// List every ticket in a category.
    List(ListArgs),
    /// Drop the cached list for a category and fetch it again.
    Reset {
        category: Option<String>,
    },
    /// List tickets currently being handled.
    Progress(ProgressArgs),
    /// Mark an in-progress ticket as completed (admin only).
    Finish(TransitionArgs),
    /// Send an in-progress ticket back to pending (admin only).
    Reverse(TransitionArgs),
    /// Mark a ticket as unfinished with a reason (admin only).
    Unfinish(UnfinishArgs),
    /// Ticket counts per category and status.
    Summary {
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(error) = run().await {
        if !matches!(error, AppError::Reported) {
            eprintln!("Error: {error}");
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HELPDESK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("helpdesk=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Session(args) => {
            let config = AppConfig::load()?;
            let store = FileSessionStore::new(&config.config_dir);
            let mut cache =
                QueryCache::load(QueryCache::path_for(&config.config_dir, &config.base_url))?;
            session_cmd::run(&store, &mut cache, args.command)
        }
        Commands::Ticket(command) => {
            let ctx = build_context()?;
            run_ticket_command(&ctx, command).await
        }
    }
}

fn build_context() -> AppResult<AppContext> {
    let config = AppConfig::load()?;
    let ticket_service = Arc::new(HttpTicketClient::new(
        &config.base_url,
        config.request_timeout,
    )?);
    let session_store = Arc::new(FileSessionStore::new(&config.config_dir));
    let cache = QueryCache::load(QueryCache::path_for(&config.config_dir, &config.base_url))?;

    Ok(AppContext::new(
        config,
        ticket_service,
        session_store,
        Arc::new(ConsoleNotifier),
        cache,
    ))
}

async fn run_ticket_command(ctx: &AppContext, command: TicketCommand) -> AppResult<()> {
    match command {
        TicketCommand::Submit(args) => ticket_cmd::submit(ctx, args).await,
        TicketCommand::List(args) => ticket_cmd::list(ctx, args).await,
        TicketCommand::Reset { category } => ticket_cmd::reset(ctx, category).await,
        TicketCommand::Progress(args) => ticket_cmd::progress(ctx, args).await,
        TicketCommand::Finish(args) => {
            ticket_cmd::transition(ctx, args, TransitionKind::Finish, None).await
        }
        TicketCommand::Reverse(args) => {
            ticket_cmd::transition(ctx, args, TransitionKind::Reverse, None).await
        }
        TicketCommand::Unfinish(args) => {
            let reason = Some(args.reason.as_str());
            ticket_cmd::transition(ctx, args.target, TransitionKind::Unfinish, reason).await
        }
        TicketCommand::Summary { refresh } => ticket_cmd::show_summary(ctx, refresh).await,
    }
}
