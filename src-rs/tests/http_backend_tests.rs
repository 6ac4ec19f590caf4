use std::sync::Arc;
use std::time::Duration;

use agent_tasks_rs::api::{CommandHandler, TaskServer};
use agent_tasks_rs::{
    BackendConfig, BackendError, ConversationLog, HttpTaskBackend, MessageTexts,
    OrchestratorConfig, Sender, ServerConfig, SubmitOutcome, TaskBackend, TaskOrchestrator,
    TaskStatus,
};

fn server_config(token: Option<&str>) -> ServerConfig {
    ServerConfig {
        port: 0,
        token: token.map(|t| t.to_string()),
        work_delay: Duration::from_millis(50),
    }
}

fn backend_for(addr: std::net::SocketAddr, token: Option<&str>) -> HttpTaskBackend {
    HttpTaskBackend::new(BackendConfig {
        base_url: format!("http://{}", addr),
        token: token.map(|t| t.to_string()),
        request_timeout: Duration::from_secs(5),
        ..BackendConfig::default()
    })
    .unwrap()
}

fn orchestrator_for(backend: HttpTaskBackend, log: Arc<ConversationLog>) -> TaskOrchestrator {
    let config = OrchestratorConfig::default()
        .with_poll_interval(Duration::from_millis(20))
        .unwrap();
    TaskOrchestrator::new(Arc::new(backend), log, config)
}

async fn wait_idle(orchestrator: &TaskOrchestrator) {
    let mut busy = orchestrator.subscribe_busy();
    tokio::time::timeout(Duration::from_secs(5), busy.wait_for(|busy| !*busy))
        .await
        .expect("task did not finish in time")
        .unwrap();
}

#[tokio::test]
async fn command_completes_against_dev_backend() {
    let server = TaskServer::new(server_config(Some("secret")), None);
    let (addr, _handle) = server.spawn_local().unwrap();
    let log = Arc::new(ConversationLog::new());
    let orchestrator = orchestrator_for(backend_for(addr, Some("secret")), log.clone());

    let outcome = orchestrator.submit("mostrar reporte de ventas").await;
    let task_id = outcome.task_id().unwrap().to_string();
    wait_idle(&orchestrator).await;

    let messages = log.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].text, MessageTexts::default().acknowledged);
    assert_eq!(
        messages[2].text,
        "Comando \"mostrar reporte de ventas\" procesado."
    );
    assert_eq!(
        server.state.store.get(&task_id).unwrap().status,
        TaskStatus::Completed
    );
}

#[tokio::test]
async fn failing_handler_reports_failure_text() {
    let handler: CommandHandler = Arc::new(|_: &str| Err("No hay datos de ventas.".to_string()));
    let server = TaskServer::new(server_config(None), Some(handler));
    let (addr, _handle) = server.spawn_local().unwrap();
    let log = Arc::new(ConversationLog::new());
    let orchestrator = orchestrator_for(backend_for(addr, None), log.clone());

    assert!(orchestrator.submit("ventas").await.is_accepted());
    wait_idle(&orchestrator).await;

    assert_eq!(log.last().unwrap().text, "No hay datos de ventas.");
}

#[tokio::test]
async fn missing_token_is_a_submission_failure() {
    let server = TaskServer::new(server_config(Some("secret")), None);
    let (addr, _handle) = server.spawn_local().unwrap();
    let log = Arc::new(ConversationLog::new());
    let orchestrator = orchestrator_for(backend_for(addr, None), log.clone());

    let outcome = orchestrator.submit("hola").await;
    match outcome {
        SubmitOutcome::Rejected(err) => assert!(err.to_string().contains("401")),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(!orchestrator.is_busy());
    assert_eq!(log.len(), 2);
    assert_eq!(log.last().unwrap().text, MessageTexts::default().submission_failed);
}

#[tokio::test]
async fn unreachable_backend_fails_fast() {
    let server = TaskServer::new(server_config(None), None);
    let (addr, handle) = server.spawn_local().unwrap();
    handle.abort();
    let _ = handle.await;

    let log = Arc::new(ConversationLog::new());
    let orchestrator = orchestrator_for(backend_for(addr, None), log.clone());
    let outcome = orchestrator.submit("hola").await;

    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert!(!orchestrator.is_busy());
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn raw_endpoints_map_errors() {
    let server = TaskServer::new(server_config(None), None);
    let (addr, _handle) = server.spawn_local().unwrap();
    let backend = backend_for(addr, None);

    match backend.status("task_missing").await {
        Err(BackendError::Http { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected 404, got {:?}", other),
    }
    match backend.submit("   ").await {
        Err(BackendError::Http { status, .. }) => assert_eq!(status, 400),
        other => panic!("expected 400, got {:?}", other),
    }

    let task_id = backend.submit("consulta").await.unwrap();
    let first = backend.status(&task_id).await.unwrap();
    assert!(!first.status.is_terminal());
}

#[tokio::test]
async fn task_listing_is_newest_first_with_limit() {
    let server = TaskServer::new(server_config(None), None);
    let (addr, _handle) = server.spawn_local().unwrap();
    let backend = backend_for(addr, None);
    for command in ["uno", "dos", "tres"] {
        backend.submit(command).await.unwrap();
    }

    let client = reqwest::Client::new();
    let limited: serde_json::Value = client
        .get(format!("http://{}/agent/tasks?limit=2", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let commands: Vec<&str> = limited["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["command"].as_str().unwrap())
        .collect();
    assert_eq!(commands, vec!["tres", "dos"]);

    let all: serde_json::Value = client
        .get(format!("http://{}/agent/tasks", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["tasks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn task_ids_with_reserved_characters_reach_the_status_route() {
    let server = TaskServer::new(server_config(None), None);
    let (addr, _handle) = server.spawn_local().unwrap();
    let backend = backend_for(addr, None);

    match backend.status("job/1?x#y").await {
        Err(BackendError::Http { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("job/1?x#y"));
        }
        other => panic!("expected 404 for the full id, got {:?}", other),
    }
}
