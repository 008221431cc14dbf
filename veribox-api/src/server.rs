//! HTTP server lifecycle.

use std::{net::SocketAddr, time::Duration};

use axum::Router;
use tokio::net::TcpListener;
use veribox_common::Signal;

use crate::{
    config::ApiConfig,
    error::ApiServerError,
    routes::{ApiState, router},
};

/// The bound HTTP server, ready to serve until shutdown.
pub struct ApiServer {
    listener: TcpListener,
    router: Router,
}

impl ApiServer {
    /// Bind to the configured address and build the router.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn bind(config: &ApiConfig, state: ApiState) -> Result<Self, ApiServerError> {
        let listener = TcpListener::bind(&config.listen_address)
            .await
            .map_err(|e| ApiServerError::BindError {
                address: config.listen_address.clone(),
                source: e,
            })?;

        tracing::info!(
            address = %config.listen_address,
            "API server bound successfully"
        );

        let router = router(state, Duration::from_secs(config.request_timeout_secs));

        Ok(Self { listener, router })
    }

    /// The address the server actually bound (useful with port 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be read.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the server until a shutdown signal is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a runtime error.
    pub async fn serve(
        self,
        mut shutdown: tokio::sync::broadcast::Receiver<Signal>,
    ) -> Result<(), ApiServerError> {
        tracing::info!("API server starting");

        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("API server received shutdown signal");
        })
        .await
        .map_err(|e| ApiServerError::ServerError(e.to_string()))?;

        tracing::info!("API server stopped");
        Ok(())
    }
}
