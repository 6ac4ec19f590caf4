use std::io::{self, Write};

use agent_tasks_rs::{Message, Phase, Task};

use crate::models::CLIConfig;

pub fn banner(cfg: &CLIConfig) {
    println!("Agent Tasks Debug CLI");
    println!("API: {}", cfg.base_url);
    println!("Poll every {} ms", cfg.poll_interval.as_millis());
    println!("Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                 Show commands");
    println!("  /exit | /quit          Exit");
    println!("  /history               Show the conversation");
    println!("  /status                Show the tracked task");
    println!("  /cancel                Stop tracking the current task");
    println!("  /config                Show current config");
    println!("  /base <url>            Update base URL");
    println!("  /token [token]         Update or clear bearer token");
}

pub fn message(msg: &Message) {
    println!("{}> {}", msg.sender, msg.text);
}

pub fn status(phase: Phase, task: Option<Task>) {
    println!("phase: {:?}", phase);
    if let Some(task) = task {
        println!(
            "[{}] {} - {} (since {})",
            task.status,
            task.id,
            task.command,
            task.submitted_at.format("%H:%M:%S")
        );
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  poll: {} ms", cfg.poll_interval.as_millis());
    println!("  token: {}", if cfg.token.is_some() { "set" } else { "none" });
    println!("  debug: {}", cfg.debug);
}

pub fn history(items: &[Message]) {
    if items.is_empty() {
        println!("no history");
        return;
    }
    for msg in items {
        message(msg);
    }
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
