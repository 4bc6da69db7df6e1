pub mod notifier;
pub mod session_store;
pub mod ticket_service;

#[cfg(test)]
pub mod fakes;

pub use notifier::{Notice, NoticeLevel, Notifier};
pub use session_store::SessionStore;
pub use ticket_service::TicketService;
