use todo_manager::application::todo_service::TodoServiceImpl;
use todo_manager::config::AppConfig;
use todo_manager::domain::store::TodoStore;
use todo_manager::http::routing::{self, todos};
use todo_manager::infrastructure::sqlite_store::SqliteTodoStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    prepare_sqlite_dir(&config.database_url)?;
    let store = SqliteTodoStore::connect(&config.database_url, config.max_connections).await?;
    store.init().await?;
    let service = TodoServiceImpl::new(store);
    let router = routing::app(todos::router(todos::AppState { service }));

    let addr = config.addr();
    tracing::info!(%addr, database_url = %config.database_url, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}

/// SQLite creates the database file itself, but not missing parent directories.
fn prepare_sqlite_dir(database_url: &str) -> anyhow::Result<()> {
    if database_url.starts_with("sqlite::memory:") { return Ok(()); }
    let Some(path) = database_url.strip_prefix("sqlite://") else { return Ok(()) };
    let path = path.split('?').next().unwrap_or(path);
    // On Windows, absolute paths may look like /C:/path; strip the leading slash
    let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
        &path[1..]
    } else {
        path
    };
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() { std::fs::create_dir_all(parent)?; }
    }
    Ok(())
}
