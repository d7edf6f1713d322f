//! Shared node state for the HTTP handlers.

use gatepay_gateway::Environment;
use gatepay_processor::ProcessorRegistry;
use std::sync::Arc;
use std::time::Instant;

use crate::storage::Storage;

/// Shared state for the running node, accessible from HTTP handlers.
pub struct NodeState {
    /// When the node started.
    pub start_time: Instant,
    /// Record store, also the vault link store of every processor.
    pub storage: Arc<Storage>,
    /// Processors sharing one gateway client.
    pub registry: ProcessorRegistry,
    pub gateway_id: String,
    pub environment: Environment,
}

impl NodeState {
    pub fn new(
        storage: Arc<Storage>,
        registry: ProcessorRegistry,
        gateway_id: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            start_time: Instant::now(),
            storage,
            registry,
            gateway_id: gateway_id.into(),
            environment,
        }
    }
}
