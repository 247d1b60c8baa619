use axum::{routing::get, Router};
use event_bus::{EventBus, InMemoryBus, NatsBus};
use event_contracts::Publisher;
use replica_store::{MemoryStore, PgStore, ReplicaStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use order_rs::{
    config::Config,
    health::health,
    listeners::spawn_listeners,
    order::Order,
    order_service::{OrderService, Pricing},
    replicas::{CartReplica, UserReplica},
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Starting order service...");

    let config = Config::from_env().expect("Failed to load configuration from environment");

    tracing::info!(
        "Configuration loaded: host={}, port={}, bus_type={}, store_type={}",
        config.host,
        config.port,
        config.bus_type,
        config.store_type
    );

    let orders: Arc<dyn ReplicaStore<Order>>;
    let users: Arc<dyn ReplicaStore<UserReplica>>;
    let carts: Arc<dyn ReplicaStore<CartReplica>>;
    match config.store_type.as_str() {
        "memory" => {
            tracing::info!("Using in-memory stores");
            orders = Arc::new(MemoryStore::new());
            users = Arc::new(MemoryStore::new());
            carts = Arc::new(MemoryStore::new());
        }
        "postgres" => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL checked by Config::from_env");
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .expect("Failed to connect to database");

            let order_store = PgStore::new(pool.clone(), "order");
            let user_store = PgStore::new(pool.clone(), "user");
            let cart_store = PgStore::new(pool, "cart");
            order_store
                .ensure_schema()
                .await
                .expect("Failed to create order schema");
            user_store
                .ensure_schema()
                .await
                .expect("Failed to create user replica schema");
            cart_store
                .ensure_schema()
                .await
                .expect("Failed to create cart replica schema");
            orders = Arc::new(order_store);
            users = Arc::new(user_store);
            carts = Arc::new(cart_store);
        }
        other => panic!("Invalid STORE_TYPE: {other}. Must be 'memory' or 'postgres'"),
    }

    let bus: Arc<dyn EventBus> = match config.bus_type.to_lowercase().as_str() {
        "inmemory" => {
            tracing::info!("Using InMemory event bus");
            Arc::new(InMemoryBus::new())
        }
        "nats" => {
            tracing::info!("Connecting to NATS at {}", config.nats_url);
            let client = async_nats::ConnectOptions::new()
                .event_callback(|event| async move {
                    if matches!(event, async_nats::Event::Closed) {
                        tracing::error!("NATS connection closed, exiting");
                        std::process::exit(1);
                    }
                })
                .connect(&config.nats_url)
                .await
                .expect("Failed to connect to NATS");
            Arc::new(NatsBus::new(client))
        }
        other => panic!("Invalid BUS_TYPE: {other}. Must be 'inmemory' or 'nats'"),
    };

    spawn_listeners(bus.clone(), users.clone(), carts.clone());

    // Write path used by the (out-of-scope) checkout controllers
    let order_service = OrderService::new(
        orders,
        users,
        carts,
        Publisher::new(bus),
        Pricing {
            tax_price: config.tax_price,
            shipping_price: config.shipping_price,
        },
    );

    let app = Router::new()
        .route("/api/health", get(health))
        .with_state(order_service)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("order service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed to start");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
