//! Development HTTP server: the filtered-resources endpoint backed by a
//! [`Catalog`], the `/api` reverse-proxy rule, and a `Host` allow-list in
//! front of both.

pub mod error;
pub mod proxy;
pub mod routes;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Request, State},
    http::header::HOST,
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::{any, get},
};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::console::console;

pub use error::AppError;
pub use proxy::DevProxy;

#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<Catalog>,
    pub query_param: String,
    pub allowed_hosts: Arc<[String]>,
    pub proxy: Arc<DevProxy>,
}

impl ServerState {
    pub fn new(config: &AppConfig, catalog: Catalog) -> Result<Self> {
        Ok(Self {
            catalog: Arc::new(catalog),
            query_param: config.endpoint.query_param.clone(),
            allowed_hosts: config
                .server
                .allowed_hosts
                .iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
            proxy: Arc::new(DevProxy::new(&config.proxy)?),
        })
    }

    pub fn is_allowed_host(&self, host: &str) -> bool {
        let host = strip_port(host).to_ascii_lowercase();
        self.allowed_hosts.iter().any(|allowed| *allowed == host)
    }
}

pub fn app(config: &AppConfig, catalog: Catalog) -> Result<Router> {
    let state = ServerState::new(config, catalog)?;
    let prefix = config.proxy.prefix.trim_end_matches('/');

    Ok(Router::new()
        .route(&config.endpoint.path, get(routes::filtered_resources_handler))
        .route(prefix, any(proxy::proxy_handler))
        .route(&format!("{}/*rest", prefix), any(proxy::proxy_handler))
        .layer(from_fn_with_state(state.clone(), host_allow_list))
        .with_state(state))
}

/// Binds `server.host:server.port` and serves until `shutdown` resolves.
pub async fn serve<F>(config: &AppConfig, catalog: Catalog, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = app(config, catalog)?;
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    console().success(&format!("Serving on http://{}", listener.local_addr()?));
    console().info(&format!(
        "Proxying {} -> {}",
        config.proxy.prefix, config.proxy.target
    ));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server terminated unexpectedly")?;

    console().info("Server shut down");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            console().warning(&format!("Failed to install Ctrl+C handler: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                console().warning(&format!("Failed to install signal handler: {}", e));
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

async fn host_allow_list(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !state.is_allowed_host(host) {
        console().warning(&format!("Rejected request for host '{}'", host));
        return Err(AppError::ForbiddenHost {
            host: host.to_string(),
        });
    }

    Ok(next.run(request).await)
}

/// Host name without its port; bracketed IPv6 literals lose the brackets.
pub fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(addr, _)| addr);
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
