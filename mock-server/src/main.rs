use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mock_server::MockState;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let token = std::env::var("MOCK_TOKEN").unwrap_or_else(|_| "mock-token".to_string());
    let channels = std::env::var("MOCK_CHANNELS").unwrap_or_else(|_| "1".to_string());

    let mut state = MockState::new(&token);
    for id in channels.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        state = state.with_channel(id);
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, %channels, "listening");
    mock_server::run(listener, state.into_db()).await
}
