//! Canteen pre-ordering service.
//!
//! Students pick items from the menu and get a reference code to show at the
//! counter. Staff see every order on a dashboard gated by a shared key.
//!
//!
//!
//! # Routes
//!
//! | Method | Path | Behaviour |
//! |---|---|---|
//! | `GET` | `/` | order form with the menu |
//! | `POST` | `/` | place order, `303` to `/success/%23XXXXX`, `422` re-render on bad input |
//! | `GET` | `/success/{reference}` | confirmation, `404` if unknown |
//! | `GET` | `/staff?key=` | staff dashboard, `401` on bad or missing key |
//! | `GET` | `/api/orders?key=` | same listing as JSON |
//! | `GET` | `/api/menu` | menu as JSON |
//!
//!
//!
//! # Configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `5000` |
//! | `DATABASE_URL` | `sqlite://orders.db?mode=rwc`, or `redis://...` |
//! | `STAFF_KEY` | `admin_secret_123`, also read from `/run/secrets/STAFF_KEY` |
//! | `MENU_PATH` | unset, built-in menu |
//!
//! The defaults are for local use only. Always set `STAFF_KEY` when deploying.
//! A `.env` file in the working directory is loaded first.
//!
//!
//!
//! # Setup
//!
//! Run locally with logs.
//! ```sh
//! RUST_LOG=info cargo run
//! ```
//!
//! Staff dashboard.
//! ```sh
//! open "http://localhost:5000/staff?key=admin_secret_123"
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::Error;
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod orders;
pub mod routes;
pub mod state;
pub mod utils;
pub mod views;

use config::Config;
use routes::{
    api_menu_handler, api_orders_handler, index_handler, staff_handler, submit_handler,
    success_handler,
};
use state::State;

pub async fn start_server() -> Result<(), Error> {
    dotenv::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config).await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/orders", get(api_orders_handler))
        .route("/menu", get(api_menu_handler))
        .layer(cors);

    Router::new()
        .route("/", get(index_handler).post(submit_handler))
        .route("/success/{reference}", get(success_handler))
        .route("/staff", get(staff_handler))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
