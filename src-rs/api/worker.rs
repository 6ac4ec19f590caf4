use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::task::{TaskStatus, TaskStore};

/// Produces the report for a command; `Err` marks the task FAILED.
pub type CommandHandler = Arc<dyn Fn(&str) -> Result<String, String> + Send + Sync>;

pub fn echo_handler() -> CommandHandler {
    Arc::new(|command: &str| Ok(format!("Comando \"{}\" procesado.", command.trim())))
}

/// Runs `command` in the background, moving the task through RUNNING to a
/// terminal status after `delay`.
pub fn spawn_work(
    store: Arc<TaskStore>,
    handler: CommandHandler,
    delay: Duration,
    task_id: String,
    command: String,
) {
    tokio::spawn(async move {
        store.update(&task_id, TaskStatus::Running, None);
        tokio::time::sleep(delay).await;

        let outcome = tokio::task::spawn_blocking(move || handler(&command)).await;
        let (status, report) = match outcome {
            Ok(Ok(report)) => (TaskStatus::Completed, report),
            Ok(Err(report)) => (TaskStatus::Failed, report),
            Err(err) => {
                warn!("handler for task {} panicked: {}", task_id, err);
                (TaskStatus::Failed, "El comando no pudo completarse.".to_string())
            }
        };
        debug!("task {} -> {}", task_id, status);
        store.update(&task_id, status, Some(report));
    });
}
