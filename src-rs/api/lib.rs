//! Development task backend: an in-memory implementation of the submission
//! and status endpoints for local runs and integration tests.

pub mod handlers;
pub mod server;
pub mod worker;

pub use handlers::AppState;
pub use server::TaskServer;
pub use worker::{echo_handler, CommandHandler};
