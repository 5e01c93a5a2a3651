pub mod access;
pub mod gate;
pub mod handlers;
pub mod session;
