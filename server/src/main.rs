use anyhow::{Context, Result};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use atlas_server::{
    AppState,
    config::load_config,
    graph::GraphService,
    model::Visibility,
    relations::RelationshipResolver,
    routes,
    store::{
        EdgeStore, JsonEdgeStore, JsonEdgeStoreConfig, JsonEntityStore, JsonEntityStoreConfig,
        StoreManager,
    },
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(error = %err, "Server crashed");
        eprintln!("Server crashed: {err}");
    }
}

async fn run() -> Result<()> {
    init_tracing();

    let config = load_config()
        .await
        .context("Failed to load application configuration")?;
    let working_dir = PathBuf::from(&config.working_dir);

    let entities = Arc::new(JsonEntityStore::new(JsonEntityStoreConfig {
        working_dir: working_dir.clone(),
    }));
    let edges = Arc::new(JsonEdgeStore::new(JsonEdgeStoreConfig {
        working_dir: working_dir.clone(),
    }));

    let mut store_manager = StoreManager::new();
    store_manager.register_entities(entities.clone());
    store_manager.register_edges(edges.clone());
    store_manager.initialize_all().await?;

    let resolver = RelationshipResolver::new(entities.clone(), edges.clone());
    let graph = GraphService::new(entities.clone(), edges.clone());

    let state = Arc::new(AppState {
        config: Arc::new(config.clone()),
        entities,
        edges,
        resolver,
        graph,
    });

    let addr_string = format!("{}:{}", config.server.host, config.server.port);
    let addr = addr_string
        .parse::<SocketAddr>()
        .with_context(|| format!("Invalid server address: {addr_string}"))?;
    info!(host = %config.server.host, port = config.server.port, "Loaded configuration");

    let app = Router::new()
        .route("/", get(handler))
        .route("/health", get(health))
        .merge(routes::entity_routes())
        .merge(routes::graph_routes())
        .merge(routes::search_routes())
        .merge(routes::admin_routes())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener on {addr}"))?;
    info!(%addr, "Atlas server listening");

    let server_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(err) = store_manager.finalize_all().await {
        warn!(error = %err, "Failed to finalize stores");
    }

    server_result.context("Server encountered a fatal error")?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

async fn handler(State(state): State<Arc<AppState>>) -> Result<String, StatusCode> {
    let edges = state
        .edges
        .list(Visibility::PublishedOnly)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(format!("Connected ({} published edges)", edges.len()))
}

#[inline]
async fn health() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                if stream.recv().await.is_some() {
                    info!("Received SIGTERM");
                }
            }
            Err(err) => warn!(error = %err, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received termination signal (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received termination signal (SIGTERM)");
        }
    }
}
