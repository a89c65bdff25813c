//! # Woodpecker
//!
//! REST backend for the woodpecker tool shop.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export JWT_SECRET=...
//! export STRIPE_SECRET_KEY=sk_test_...
//! export MONGODB_URI=mongodb+srv://...
//!
//! # Run the server
//! woodpecker
//! ```

use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wp_api::{routes, AppConfig, AppState};
use wp_core::{BoxedPaymentGateway, MemoryStore, SharedStore};
use wp_mongo::MongoStore;
use wp_stripe::StripeIntentGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    // Print banner
    print_banner();

    let config = AppConfig::from_env()?;
    info!("Environment: {}", config.environment);

    // One store client for the whole process
    let mongo = match &config.mongodb_uri {
        Some(uri) => {
            let mongo = MongoStore::connect(uri, &config.database_name).await?;
            mongo.initialize_indexes().await?;
            Some(mongo)
        }
        None => {
            warn!("MONGODB_URI not set, using the in-memory store");
            None
        }
    };
    let store: SharedStore = match &mongo {
        Some(mongo) => Arc::new(mongo.clone()),
        None => Arc::new(MemoryStore::new()),
    };

    let stripe = StripeIntentGateway::from_env()?;
    info!(
        "Payment provider: stripe ({} mode, {})",
        if stripe.config().is_live_mode() { "live" } else { "test" },
        stripe.config().currency
    );
    let gateway: BoxedPaymentGateway = Arc::new(stripe);

    let state = AppState::new(config, store, gateway)?;
    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();
    info!("Store backend: {}", state.store.backend());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🪵 Woodpecker starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🔨 Tools: GET http://{}/tools", addr);
        info!("💳 Payment intent: POST http://{}/create-payment-intent", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(mongo) = mongo {
        mongo.shutdown().await;
    }
    info!("Woodpecker stopped");

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

fn print_banner() {
    println!(
        r#"
  🪵 Woodpecker 🪵
  ━━━━━━━━━━━━━━━━━━━━━━━
  Tool shop backend
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
