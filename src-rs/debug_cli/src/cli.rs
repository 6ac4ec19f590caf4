use std::env;
use std::time::Duration;

use agent_tasks_rs::config::validate_base_url;
use agent_tasks_rs::{BackendConfig, OrchestratorConfig};

use crate::models::CLIConfig;

pub fn parse_config() -> Result<CLIConfig, String> {
    let backend = BackendConfig::from_env().map_err(|err| err.to_string())?;
    let orchestrator = OrchestratorConfig::from_env().map_err(|err| err.to_string())?;
    let mut cfg = CLIConfig {
        base_url: backend.base_url,
        token: backend.token,
        poll_interval: orchestrator.poll_interval,
        debug: env_bool("AGENT_TASKS_DEBUG", false),
    };

    let args: Vec<String> = env::args().collect();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    validate_base_url(value).map_err(|err| err.to_string())?;
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--token" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.token = Some(value.clone());
                    idx += 1;
                }
            }
            "--poll-ms" => {
                if let Some(value) = args.get(idx + 1) {
                    match value.parse::<u64>() {
                        Ok(ms) if ms > 0 => cfg.poll_interval = Duration::from_millis(ms),
                        _ => return Err(format!("invalid --poll-ms: {}", value)),
                    }
                    idx += 1;
                }
            }
            "--debug" => cfg.debug = true,
            _ => {}
        }
        idx += 1;
    }

    Ok(cfg)
}

fn env_bool(key: &str, fallback: bool) -> bool {
    match env::var(key) {
        Ok(value) => value.parse::<bool>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}
