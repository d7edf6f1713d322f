use std::collections::HashMap;
use std::sync::Arc;

use gatepay_core::HostTransaction;

use crate::callback::{CallbackFields, CallbackOutcome};
use crate::error::ProcessorError;
use crate::processor::GatewayProcessor;

/// Processors by name; transactions are dispatched by their processor name.
pub struct ProcessorRegistry {
    processors: HashMap<String, Arc<GatewayProcessor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Register a processor under its configured name, replacing any previous one.
    pub fn register(&mut self, processor: GatewayProcessor) {
        let name = processor.name().to_string();
        tracing::info!(processor = %name, "Registering processor");
        self.processors.insert(name, Arc::new(processor));
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<GatewayProcessor>> {
        self.processors.remove(name)
    }

    pub fn get(&self, name: &str) -> Result<Arc<GatewayProcessor>, ProcessorError> {
        self.processors
            .get(name)
            .cloned()
            .ok_or_else(|| ProcessorError::ProcessorNotFound(name.to_string()))
    }

    /// The processor a transaction was created for.
    pub fn for_transaction(
        &self,
        transaction: &dyn HostTransaction,
    ) -> Result<Arc<GatewayProcessor>, ProcessorError> {
        self.get(transaction.processor())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.processors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.processors.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub async fn execute_transaction(
        &self,
        transaction: &mut dyn HostTransaction,
    ) -> Result<bool, ProcessorError> {
        let processor = self.for_transaction(transaction)?;
        processor.execute_transaction(transaction).await
    }

    pub async fn fetch_transaction_status(
        &self,
        transaction: &mut dyn HostTransaction,
    ) -> Result<bool, ProcessorError> {
        let processor = self.for_transaction(transaction)?;
        processor.fetch_transaction_status(transaction).await
    }

    pub async fn handle_transaction_response(
        &self,
        transaction: &mut dyn HostTransaction,
        fields: CallbackFields,
    ) -> Result<CallbackOutcome, ProcessorError> {
        let processor = self.for_transaction(transaction)?;
        processor.handle_transaction_response(transaction, fields).await
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
