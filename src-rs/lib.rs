pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod result;

#[path = "backend/lib.rs"]
pub mod backend;
#[path = "task/lib.rs"]
pub mod task;
#[path = "api/lib.rs"]
pub mod api;

pub use backend::{HttpTaskBackend, StatusReport, TaskBackend};
pub use config::{BackendConfig, MessageTexts, OrchestratorConfig, ServerConfig};
pub use conversation::{ConversationLog, ConversationSink, Message, Sender};
pub use error::{BackendError, ConfigError, TaskError};
pub use orchestrator::{Phase, TaskOrchestrator};
pub use result::SubmitOutcome;
pub use task::{Task, TaskStatus};
