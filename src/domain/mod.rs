pub mod category;
pub mod filter;
pub mod lifecycle;
pub mod session;
pub mod ticket;
