use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use gatepay_core::CoreError;
use uuid::Uuid;

/// Host customer → gateway vault customer id.
///
/// A link is created once and never overwritten.
#[async_trait]
pub trait VaultLinks: Send + Sync {
    /// The vault id linked to `customer_id`, if any.
    async fn vault_id(&self, customer_id: Uuid) -> Result<Option<String>, CoreError>;

    /// Link `customer_id` to `vault_id` unless a link already exists.
    /// Returns `true` when a new link was written.
    async fn link_if_absent(&self, customer_id: Uuid, vault_id: &str) -> Result<bool, CoreError>;
}

/// In-memory vault links.
#[derive(Debug, Default)]
pub struct MemoryVaultLinks {
    links: DashMap<Uuid, String>,
}

impl MemoryVaultLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl VaultLinks for MemoryVaultLinks {
    async fn vault_id(&self, customer_id: Uuid) -> Result<Option<String>, CoreError> {
        Ok(self.links.get(&customer_id).map(|v| v.value().clone()))
    }

    async fn link_if_absent(&self, customer_id: Uuid, vault_id: &str) -> Result<bool, CoreError> {
        match self.links.entry(customer_id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(vault_id.to_string());
                Ok(true)
            }
        }
    }
}
