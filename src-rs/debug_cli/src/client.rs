use std::sync::Arc;

use agent_tasks_rs::{
    BackendConfig, ConversationLog, HttpTaskBackend, OrchestratorConfig, TaskOrchestrator,
};

use crate::models::CLIConfig;

/// Wires an orchestrator for the current settings onto the shared log.
pub fn build_orchestrator(
    cfg: &CLIConfig,
    log: Arc<ConversationLog>,
) -> Result<TaskOrchestrator, String> {
    let backend = HttpTaskBackend::new(BackendConfig {
        base_url: cfg.base_url.clone(),
        token: cfg.token.clone(),
        ..BackendConfig::default()
    })
    .map_err(|err| err.to_string())?;
    let config = OrchestratorConfig::default()
        .with_poll_interval(cfg.poll_interval)
        .map_err(|err| err.to_string())?;
    Ok(TaskOrchestrator::new(Arc::new(backend), log, config))
}
