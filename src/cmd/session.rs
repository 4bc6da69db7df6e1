use clap::{Args, Subcommand};

use crate::cache::QueryCache;
use crate::domain::session::{Role, Session};
use crate::error::{AppError, AppResult};
use crate::services::SessionStore;

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// Store the role and session cookie issued by the admin login.
    Login {
        #[arg(long)]
        role: String,
        /// Cookie header value, e.g. `connect.sid=...`.
        #[arg(long)]
        cookie: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the stored role (cookie masked).
    Show,
}

/// Login and logout both drop cached ticket lists so no list outlives the
/// session it was fetched with.
pub fn run(
    store: &dyn SessionStore,
    cache: &mut QueryCache,
    command: SessionCommand,
) -> AppResult<()> {
    match command {
        SessionCommand::Login { role, cookie } => {
            let session = login(role, cookie)?;
            store.save(&session)?;
            cache.clear();
            cache.save()?;
            println!("Logged in as {}.", display_role(&session));
        }
        SessionCommand::Logout => {
            store.logout()?;
            cache.clear();
            cache.save()?;
            println!("Logged out.");
        }
        SessionCommand::Show => {
            let session = store.current();
            println!("Role: {}", display_role(&session));
            println!("Cookie: {}", mask_secret(session.cookie.as_deref()));
        }
    }
    Ok(())
}

fn login(role: String, cookie: String) -> AppResult<Session> {
    if role.trim().is_empty() {
        return Err(AppError::Validation("role must not be empty".to_string()));
    }
    let cookie = cookie.trim().to_string();
    if cookie.is_empty() {
        return Err(AppError::Validation("cookie must not be empty".to_string()));
    }
    Ok(Session::new(Role::from(role), Some(cookie)))
}

fn display_role(session: &Session) -> &str {
    session
        .role
        .as_ref()
        .map(Role::as_str)
        .unwrap_or("<not logged in>")
}

fn mask_secret(value: Option<&str>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars = token.chars().collect::<Vec<_>>();
            let prefix = chars[..3].iter().collect::<String>();
            let suffix = chars[chars.len() - 3..].iter().collect::<String>();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
