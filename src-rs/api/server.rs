use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::handlers::{handle_health, handle_status, handle_submit, handle_tasks, AppState};
use super::worker::{echo_handler, CommandHandler};
use crate::config::ServerConfig;
use crate::task::TaskStore;

pub struct TaskServer {
    pub port: u16,
    pub state: AppState,
}

impl TaskServer {
    pub fn new(config: ServerConfig, handler: Option<CommandHandler>) -> Self {
        Self {
            port: config.port,
            state: AppState {
                store: Arc::new(TaskStore::new()),
                handler: handler.unwrap_or_else(echo_handler),
                token: config.token,
                work_delay: config.work_delay,
            },
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handle_health))
            .route("/agent/command", post(handle_submit))
            .route("/agent/tasks", get(handle_tasks))
            .route("/agent/tasks/:id", get(handle_status))
            .with_state(self.state.clone())
    }

    pub async fn start(&self) -> Result<(), String> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("task backend listening on {}", addr);
        axum::Server::try_bind(&addr)
            .map_err(|err| err.to_string())?
            .serve(self.router().into_make_service())
            .await
            .map_err(|err| err.to_string())
    }

    /// Serves on an ephemeral localhost port in the background.
    pub fn spawn_local(&self) -> Result<(SocketAddr, JoinHandle<()>), String> {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let server = axum::Server::try_bind(&addr)
            .map_err(|err| err.to_string())?
            .serve(self.router().into_make_service());
        let local = server.local_addr();
        let handle = tokio::spawn(async move {
            if let Err(err) = server.await {
                error!("task backend stopped: {}", err);
            }
        });
        Ok((local, handle))
    }
}
