//! Gatepay processor
//!
//! Drives host transactions through the gateway: charge execution, status
//! reconciliation, failure-code mapping, customer vault linkage, client
//! tokens and checkout callbacks.

pub mod error;
pub mod config;
pub mod failure_codes;
pub mod vault;
pub mod processor;
pub mod charge;
pub mod translate;
pub mod reconcile;
pub mod callback;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use callback::{CallbackFields, CallbackOutcome};
pub use config::{ProcessorConfig, RefusalPolicy};
pub use error::ProcessorError;
pub use failure_codes::{failure_code, failure_code_for, response_code};
pub use processor::GatewayProcessor;
pub use registry::ProcessorRegistry;
pub use vault::{MemoryVaultLinks, VaultLinks};
