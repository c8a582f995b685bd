pub mod handlers;
pub mod identity;
pub mod phase;
pub mod router;
pub mod session;
