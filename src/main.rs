use std::net::SocketAddr;
use std::sync::Arc;

use axum::{serve, Extension};
use dice_graphql::{
    api,
    infrastructure::{config::Config, state::AppState},
    telemetry,
};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    telemetry::init();
    let config = Arc::new(Config::from_env()?);
    let state = Arc::new(AppState::new(Arc::clone(&config)));

    let router = api::build_router().layer(Extension(Arc::clone(&state)));

    let addr: SocketAddr = config.bind_address().parse()?;
    info!(%addr, "starting graphql dice server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server = serve(listener, router.into_make_service());

    tokio::select! {
        res = server => {
            if let Err(err) = res {
                warn!(error = ?err, "server exited with error");
            }
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
