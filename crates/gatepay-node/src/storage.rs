//! RocksDB storage backend for the Gatepay node.

use anyhow::Result;
use async_trait::async_trait;
use gatepay_core::{CoreError, PaymentMethodRecord, RecordSink, TransactionRecord};
use gatepay_processor::VaultLinks;
use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Column family names for different record types.
const CF_TRANSACTIONS: &str = "transactions";
const CF_PAYMENT_METHODS: &str = "payment_methods";
const CF_VAULT_LINKS: &str = "vault_links";

/// RocksDB-backed record store for the node.
pub struct Storage {
    db: DB,
    /// Serializes check-then-write on vault links.
    vault_guard: Mutex<()>,
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default()),
            ColumnFamilyDescriptor::new(CF_PAYMENT_METHODS, Options::default()),
            ColumnFamilyDescriptor::new(CF_VAULT_LINKS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            vault_guard: Mutex::new(()),
        })
    }

    fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let value = self.db.get_cf(&cf, key)?;
        Ok(value)
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.put(cf_name, key, &bytes)
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        match self.get(cf_name, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Store a transaction record, including its embedded payment method snapshot.
    pub fn put_transaction(&self, record: &TransactionRecord) -> Result<()> {
        self.put_json(CF_TRANSACTIONS, record.id.as_bytes(), record)
    }

    /// Store a payment method record.
    pub fn put_payment_method(&self, record: &PaymentMethodRecord) -> Result<()> {
        self.put_json(CF_PAYMENT_METHODS, record.id.as_bytes(), record)
    }

    pub fn get_payment_method(&self, id: Uuid) -> Result<Option<PaymentMethodRecord>> {
        self.get_json(CF_PAYMENT_METHODS, id.as_bytes())
    }

    /// Get a transaction with the latest stored version of its payment method.
    pub fn get_transaction(&self, id: Uuid) -> Result<Option<TransactionRecord>> {
        let Some(mut record) = self.get_json::<TransactionRecord>(CF_TRANSACTIONS, id.as_bytes())?
        else {
            return Ok(None);
        };
        if let Some(payment_method) = self.get_payment_method(record.payment_method.id)? {
            record.payment_method = payment_method;
        }
        Ok(Some(record))
    }

    /// Load a transaction with saves routed back into this store.
    pub fn load_transaction(self: &Arc<Self>, id: Uuid) -> Result<Option<TransactionRecord>> {
        let mut record = self.get_transaction(id)?;
        if let Some(record) = record.as_mut() {
            record.attach_sink(self.clone());
        }
        Ok(record)
    }

    pub fn get_vault_link(&self, customer_id: Uuid) -> Result<Option<String>> {
        let value = self.get(CF_VAULT_LINKS, customer_id.as_bytes())?;
        Ok(value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Write a vault link unless one exists. Returns `true` when written.
    pub fn put_vault_link_if_absent(&self, customer_id: Uuid, vault_id: &str) -> Result<bool> {
        let _guard = self
            .vault_guard
            .lock()
            .map_err(|_| anyhow::anyhow!("vault link lock poisoned"))?;
        if self.get(CF_VAULT_LINKS, customer_id.as_bytes())?.is_some() {
            return Ok(false);
        }
        self.put(CF_VAULT_LINKS, customer_id.as_bytes(), vault_id.as_bytes())?;
        Ok(true)
    }
}

fn persistence(e: anyhow::Error) -> CoreError {
    CoreError::Persistence(e.to_string())
}

impl RecordSink for Storage {
    fn store_transaction(&self, record: &TransactionRecord) -> Result<(), CoreError> {
        self.put_transaction(record).map_err(persistence)
    }

    fn store_payment_method(&self, record: &PaymentMethodRecord) -> Result<(), CoreError> {
        self.put_payment_method(record).map_err(persistence)
    }
}

#[async_trait]
impl VaultLinks for Storage {
    async fn vault_id(&self, customer_id: Uuid) -> Result<Option<String>, CoreError> {
        self.get_vault_link(customer_id).map_err(persistence)
    }

    async fn link_if_absent(&self, customer_id: Uuid, vault_id: &str) -> Result<bool, CoreError> {
        self.put_vault_link_if_absent(customer_id, vault_id)
            .map_err(persistence)
    }
}
