use gatepay_core::Secret;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway environment the credentials belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sandbox => write!(f, "sandbox"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Merchant credentials for the gateway client.
///
/// Built once at startup and handed to the gateway client; processors share
/// the resulting client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_merchant_id")]
    pub merchant_id: String,
    #[serde(default = "default_public_key")]
    pub public_key: String,
    #[serde(default = "default_private_key")]
    pub private_key: Secret,
}

fn default_merchant_id() -> String {
    "your-merchant-id".into()
}
fn default_public_key() -> String {
    "your-public-key".into()
}
fn default_private_key() -> Secret {
    Secret::new("your-private-key")
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            merchant_id: default_merchant_id(),
            public_key: default_public_key(),
            private_key: default_private_key(),
        }
    }
}
