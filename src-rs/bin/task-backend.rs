use agent_tasks_rs::api::TaskServer;
use agent_tasks_rs::config::ServerConfig;
use agent_tasks_rs::logging::init_logging;

#[tokio::main]
async fn main() {
    if let Err(err) = init_logging("info") {
        eprintln!("{}", err);
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {}", err);
            std::process::exit(2);
        }
    };

    let server = TaskServer::new(config, None);
    if let Err(err) = server.start().await {
        eprintln!("server error: {}", err);
        std::process::exit(1);
    }
}
