pub mod drag;
pub mod history;
pub mod session;
