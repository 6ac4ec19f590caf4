use std::sync::Arc;

use agent_tasks_rs::config::validate_base_url;
use agent_tasks_rs::{ConversationLog, Sender, TaskOrchestrator};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::client::build_orchestrator;
use crate::models::CLIConfig;
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    log: Arc<ConversationLog>,
    orchestrator: TaskOrchestrator,
    seen: usize,
}

impl REPL {
    pub fn new(config: CLIConfig) -> Result<Self, String> {
        let log = Arc::new(ConversationLog::new());
        let orchestrator = build_orchestrator(&config, log.clone())?;
        Ok(Self {
            config,
            log,
            orchestrator,
            seen: 0,
        })
    }

    pub async fn run(&mut self) {
        render::banner(&self.config);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            render::prompt();
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                _ => break,
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line) {
                    break;
                }
                continue;
            }
            self.send(&line).await;
        }
        self.orchestrator.dispose();
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "history" => render::history(&self.log.messages()),
            "status" => render::status(self.orchestrator.phase(), self.orchestrator.current_task()),
            "cancel" => {
                self.orchestrator.dispose();
                render::info("tracking cancelled");
            }
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else if let Err(err) = validate_base_url(rest) {
                    render::error(&err.to_string());
                } else {
                    self.config.base_url = rest.to_string();
                    self.rebuild("base url updated");
                }
            }
            "token" => {
                if rest.is_empty() {
                    self.config.token = None;
                    self.rebuild("token cleared");
                } else {
                    self.config.token = Some(rest.to_string());
                    self.rebuild("token updated");
                }
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn rebuild(&mut self, done: &str) {
        match build_orchestrator(&self.config, self.log.clone()) {
            Ok(orchestrator) => {
                self.orchestrator = orchestrator;
                render::info(done);
            }
            Err(err) => render::error(&err),
        }
    }

    async fn send(&mut self, line: &str) {
        let outcome = self.orchestrator.submit(line).await;
        self.flush();
        if !outcome.is_accepted() {
            return;
        }

        render::info("(working, Ctrl-C cancels)");
        let mut busy = self.orchestrator.subscribe_busy();
        tokio::select! {
            _ = busy.wait_for(|busy| !*busy) => {}
            _ = tokio::signal::ctrl_c() => {
                self.orchestrator.dispose();
                render::info("cancelled");
            }
        }
        self.flush();
    }

    /// Prints agent messages appended since the last flush.
    fn flush(&mut self) {
        let fresh = self.log.since(self.seen);
        self.seen += fresh.len();
        for msg in fresh.iter().filter(|msg| msg.sender == Sender::Agent) {
            render::message(msg);
        }
    }
}
