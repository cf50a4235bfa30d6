use mock_server::{ApiKeys, Store, DEFAULT_API_KEY};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let keys = std::env::var("API_KEYS").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
    let keys = ApiKeys::new(keys.split(',').map(str::trim).filter(|key| !key.is_empty()));
    let store = if std::env::var_os("SEED").is_some() {
        Store::with_sample_data()
    } else {
        Store::new()
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    mock_server::run(listener, mock_server::app_with(store, keys)).await
}
