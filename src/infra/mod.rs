pub mod console;
pub mod http;
pub mod session_file;
