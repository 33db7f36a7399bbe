use outcome_http::{ClientBuilder, Interceptor, LogLevel, Outcome};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Todo {
    id: u64,
    title: String,
    completed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("outcome_http=debug")),
        )
        .init();

    let base_url = std::env::var("OUTCOME_HTTP_BASE_URL")
        .unwrap_or_else(|_| "https://jsonplaceholder.typicode.com".to_owned());

    let client = ClientBuilder::new()
        .base_url(base_url)
        .log_level(LogLevel::Info)
        .retry(true, 2)
        .interceptor(Interceptor::new().on_request(|request| {
            request.headers_mut().insert(
                "x-client",
                reqwest::header::HeaderValue::from_static("outcome-http-demo"),
            );
        }))
        .build()?;

    match client.get::<Todo, _>("/todos/1", ()).await {
        Outcome::Success { status_code, body } => {
            if let Some(todo) = body {
                println!(
                    "{status_code}: #{} {} (done: {})",
                    todo.id, todo.title, todo.completed
                );
            }
        }
        Outcome::Error { status_code, message } => {
            println!("error {status_code:?}: {message}");
        }
        Outcome::NoConnectivity { message } => println!("offline: {message}"),
        Outcome::SessionExpired { message, .. } => println!("session expired: {message}"),
        Outcome::Loading => {}
    }

    Ok(())
}
