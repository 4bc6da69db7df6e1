pub mod config;
pub mod render;
pub mod session;
pub mod ticket;
