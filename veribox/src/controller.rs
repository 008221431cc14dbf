//! Service construction and process lifecycle.

use std::sync::Arc;

use serde::Deserialize;
use tokio::{sync::broadcast, task::JoinSet};
use tracing::{error, info, warn};
use veribox_api::{ApiConfig, ApiServer, ApiState};
use veribox_common::Signal;
use veribox_delivery::{DeliveryConfig, DeliveryService};
use veribox_verify::{MailboxVerifier, ProbeConfig};

/// Root configuration, deserialized from the TOML config file.
#[derive(Debug, Default, Deserialize)]
pub struct Veribox {
    /// HTTP server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Delivery pipeline settings. Without an `smtp` relay section the
    /// service runs in simulation mode.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Mailbox prober settings.
    #[serde(default)]
    pub verifier: ProbeConfig,
}

impl Veribox {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error when the text is not a valid configuration.
    pub fn from_config_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Run the service until ctrl-c.
    ///
    /// Construction order matters only in that everything shares the one
    /// shutdown channel: on ctrl-c the API server finishes in-flight
    /// requests and the queue drain finishes its in-flight job before
    /// both exit.
    ///
    /// # Errors
    ///
    /// Returns an error if construction or binding fails; runtime task
    /// failures are logged instead, so one component going down still
    /// lets the process shut down in an orderly way.
    pub async fn run(self) -> anyhow::Result<()> {
        let (shutdown, _) = broadcast::channel::<Signal>(1);

        let delivery = Arc::new(DeliveryService::new(self.delivery));
        let verifier = Arc::new(MailboxVerifier::new(self.verifier)?);

        if delivery.is_live() {
            info!("SMTP relay configured, live delivery enabled");
        } else {
            warn!("no SMTP relay configured, running in simulation mode");
        }

        let state = ApiState {
            delivery: delivery.clone(),
            verifier,
        };
        let api = ApiServer::bind(&self.api, state).await?;

        let mut tasks = JoinSet::new();

        {
            let delivery = delivery.clone();
            let rx = shutdown.subscribe();
            tasks.spawn(async move {
                delivery.serve(rx).await;
            });
        }

        {
            let rx = shutdown.subscribe();
            tasks.spawn(async move {
                if let Err(error) = api.serve(rx).await {
                    error!(%error, "API server failed");
                }
            });
        }

        tokio::signal::ctrl_c().await?;
        info!("shutdown requested");
        let _ = shutdown.send(Signal::Shutdown);

        while tasks.join_next().await.is_some() {}
        info!("shutdown complete");

        Ok(())
    }
}
