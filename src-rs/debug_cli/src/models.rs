use std::time::Duration;

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub poll_interval: Duration,
    pub debug: bool,
}
