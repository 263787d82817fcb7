use std::net::SocketAddr;
use std::time::Duration;

use mongodb::Client;

use marketpulse::{config, routes, services, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(err) = services::db_init::ensure_indexes(&db).await {
        tracing::warn!("index setup failed: {err}");
    }

    let provider = services::yahoo::YahooClient::new(
        settings.provider_base_url.clone(),
        Duration::from_secs(settings.provider_timeout_secs),
    );

    let state = AppState {
        db,
        settings: settings.clone(),
        provider,
        cache: services::cache::MemoryCache::new(),
    };

    services::jobs::spawn_alert_monitor(state.clone());
    services::jobs::spawn_daily_refresh(state.clone());

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings
            .host
            .parse::<std::net::IpAddr>()
            .expect("invalid HOST"),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
