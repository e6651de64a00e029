#![warn(clippy::unwrap_used)]

pub mod handlers;
pub mod router;
pub mod server;

pub use router::loyalty_router;
pub use server::ApiServer;
