use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use welcompose_media::config::MediaConfig;
use welcompose_media::infrastructure::{database, storage};
use welcompose_media::services::access::AllowAll;
use welcompose_media::services::media_object_service::MediaObjectService;
use welcompose_media::{AppState, create_app};

/// Interval between sweeps of idle per-object locks
const LOCK_CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "welcompose_media=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Welcompose media service...");

    let db = database::setup_database().await?;

    let config = MediaConfig::from_env();
    config.validate()?;
    info!(
        "🛡️  Media Config: Max Size={}MB, Thumbnails={}x{} (fill up: {})",
        config.max_file_size / 1024 / 1024,
        config.thumbnail_width,
        config.thumbnail_height,
        config.thumbnail_fill_up
    );
    storage::setup_store(&config).await;

    // Authentication and capability checks happen in front of this service
    let media = Arc::new(MediaObjectService::new(
        db.clone(),
        config.clone(),
        Arc::new(AllowAll),
    ));

    let locks = media.locks().clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LOCK_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            locks.cleanup();
        }
    });

    let state = AppState {
        db: db.clone(),
        media,
        config: config.clone(),
    };

    let app = create_app(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        info!(
                            "📤 Finished in {:?} with status {}",
                            latency,
                            response.status()
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            // room for the multipart envelope and text fields
            config.max_file_size + 1024 * 1024,
        ));

    let addr: SocketAddr = std::env::var("BIND_ADDRESS")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;
    info!("✅ Server ready at http://{}", addr);
    info!("📖 OpenAPI: http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
