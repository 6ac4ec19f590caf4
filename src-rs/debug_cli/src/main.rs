mod cli;
mod client;
mod models;
mod repl;
mod render;

use agent_tasks_rs::logging::init_logging;
use repl::REPL;

#[tokio::main]
async fn main() {
    let config = match cli::parse_config() {
        Ok(config) => config,
        Err(err) => {
            render::error(&err);
            std::process::exit(2);
        }
    };
    let level = if config.debug { "debug" } else { "warn" };
    if let Err(err) = init_logging(level) {
        render::error(&err);
    }

    let mut repl = match REPL::new(config) {
        Ok(repl) => repl,
        Err(err) => {
            render::error(&err);
            std::process::exit(1);
        }
    };
    repl.run().await;
}
