use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_SUBMIT_PATH: &str = "/agent/command";
const DEFAULT_STATUS_PATH: &str = "/agent/tasks";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_MS: u64 = 3000;
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WORK_MS: u64 = 2000;

/// Where the task endpoints live and how to authenticate against them.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub submit_path: String,
    pub status_path: String,
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            token: None,
            submit_path: DEFAULT_SUBMIT_PATH.to_string(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or("AGENT_TASKS_URL", DEFAULT_URL.to_string());
        validate_base_url(&base_url)?;
        Ok(Self {
            base_url,
            token: env_opt("AGENT_TASKS_TOKEN"),
            submit_path: env_or("AGENT_TASKS_SUBMIT_PATH", DEFAULT_SUBMIT_PATH.to_string()),
            status_path: env_or("AGENT_TASKS_STATUS_PATH", DEFAULT_STATUS_PATH.to_string()),
            request_timeout: Duration::from_secs(env_u64(
                "AGENT_TASKS_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }

    pub fn submit_url(&self) -> String {
        join_url(&self.base_url, &self.submit_path)
    }

    /// The task id is opaque and always lands in a single path segment.
    pub fn status_url(&self, task_id: &str) -> Result<Url, ConfigError> {
        let base = join_url(&self.base_url, &self.status_path);
        let mut url = Url::parse(&base).map_err(|_| ConfigError::InvalidUrl(base.clone()))?;
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidUrl(base.clone()))?
            .pop_if_empty()
            .push(task_id);
        Ok(url)
    }
}

/// Accepts absolute `http` and `https` urls with a host.
pub fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ConfigError::InvalidUrl(raw.to_string())),
    }
}

/// Texts the orchestrator writes into the conversation on behalf of the agent.
#[derive(Clone, Debug)]
pub struct MessageTexts {
    pub acknowledged: String,
    pub no_detail: String,
    pub submission_failed: String,
    pub polling_failed: String,
}

impl Default for MessageTexts {
    fn default() -> Self {
        Self {
            acknowledged: "Comando recibido, procesando...".to_string(),
            no_detail: "La tarea finalizó sin detalles.".to_string(),
            submission_failed: "No se pudo enviar el comando. Intenta de nuevo.".to_string(),
            polling_failed: "Se perdió el seguimiento de la tarea. Intenta de nuevo.".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    pub poll_interval: Duration,
    pub messages: MessageTexts,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            messages: MessageTexts::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let poll_ms = env_u64("AGENT_TASKS_POLL_MS", DEFAULT_POLL_MS)?;
        Self::default().with_poll_interval(Duration::from_millis(poll_ms))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        self.poll_interval = interval;
        Ok(self)
    }
}

/// Settings for the development task backend.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub token: Option<String>,
    pub work_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            token: None,
            work_delay: Duration::from_millis(DEFAULT_WORK_MS),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env_opt("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
                key: "PORT".to_string(),
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            port,
            token: env_opt("AGENT_TASKS_TOKEN"),
            work_delay: Duration::from_millis(env_u64("AGENT_TASKS_WORK_MS", DEFAULT_WORK_MS)?),
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/').trim_end_matches('/')
    )
}

fn env_or(key: &str, fallback: String) -> String {
    env_opt(key).unwrap_or(fallback)
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_u64(key: &str, fallback: u64) -> Result<u64, ConfigError> {
    match env_opt(key) {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(fallback),
    }
}
