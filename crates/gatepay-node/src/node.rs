//! Node assembly: storage, the shared gateway client and the processor registry.

use anyhow::Result;
use gatepay_gateway::adapters::SandboxGateway;
use gatepay_gateway::{Environment, Gateway, GatewayConfig};
use gatepay_processor::{GatewayProcessor, ProcessorRegistry, VaultLinks};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api;
use crate::config::GatepayConfig;
use crate::state::NodeState;
use crate::storage::Storage;

/// Build the gateway client once; every processor shares it.
pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn Gateway>> {
    match config.environment {
        Environment::Sandbox => Ok(Arc::new(SandboxGateway::new(config.clone()))),
        Environment::Production => {
            anyhow::bail!("no production gateway client is available in this build")
        }
    }
}

/// Register one processor per configured entry.
pub fn build_registry(
    config: &GatepayConfig,
    gateway: Arc<dyn Gateway>,
    vault_links: Arc<dyn VaultLinks>,
) -> Result<ProcessorRegistry> {
    let mut registry = ProcessorRegistry::new();
    for processor in &config.processors {
        if registry.contains(&processor.name) {
            anyhow::bail!("processor '{}' is configured twice", processor.name);
        }
        registry.register(GatewayProcessor::new(
            processor.clone(),
            Arc::clone(&gateway),
            Arc::clone(&vault_links),
        ));
    }
    Ok(registry)
}

/// A configured Gatepay node.
pub struct GatepayNode {
    config: GatepayConfig,
    state: Arc<NodeState>,
}

impl GatepayNode {
    pub fn new(config: GatepayConfig) -> Result<Self> {
        let storage = Arc::new(Storage::open(&config.storage.data_dir)?);
        tracing::info!(data_dir = %config.storage.data_dir.display(), "Storage opened");

        let gateway = build_gateway(&config.gateway)?;
        let gateway_id = gateway.gateway_id().to_string();
        let registry = build_registry(&config, gateway, storage.clone())?;

        let state = Arc::new(NodeState::new(
            storage,
            registry,
            gateway_id,
            config.gateway.environment,
        ));
        Ok(Self { config, state })
    }

    /// Serve the HTTP API until `shutdown` resolves.
    pub async fn run(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let listen_addr: SocketAddr = self.config.api_addr().parse()?;
        api::start_api_server(listen_addr, self.state, shutdown).await
    }
}
