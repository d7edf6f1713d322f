//! Serde-backed host records.
//!
//! A minimal host: records implement the capability traits on top of
//! [`TransactionStateMachine`] and hand themselves to a [`RecordSink`] on
//! `save`. The node stores them in RocksDB; tests use [`SaveJournal`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::CoreError;
use crate::host::{HostCustomer, HostPaymentMethod, HostTransaction};
use crate::state_machine::{TransactionEvent, TransactionState, TransactionStateMachine};
use crate::types::{Amount, FailureCode, PaymentMethodData, TransactionData};

/// Destination for persisted records.
pub trait RecordSink: Send + Sync {
    fn store_transaction(&self, record: &TransactionRecord) -> Result<(), CoreError>;
    fn store_payment_method(&self, record: &PaymentMethodRecord) -> Result<(), CoreError>;
}

/// Optional sink attached to a record; not serialized.
#[derive(Clone, Default)]
pub struct SinkHandle(Option<Arc<dyn RecordSink>>);

impl fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("SinkHandle(attached)"),
            None => f.write_str("SinkHandle(detached)"),
        }
    }
}

/// A billing customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl CustomerRecord {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl HostCustomer for CustomerRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn first_name(&self) -> &str {
        &self.first_name
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }
}

/// A payment method owned by a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodRecord {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub processor: String,
    #[serde(default)]
    pub canceled: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub data: PaymentMethodData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    sink: SinkHandle,
}

impl PaymentMethodRecord {
    pub fn new(customer_id: Uuid, processor: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            customer_id,
            processor: processor.into(),
            canceled: false,
            verified: false,
            data: PaymentMethodData::default(),
            created_at: now,
            updated_at: now,
            sink: SinkHandle::default(),
        }
    }

    pub fn attach_sink(&mut self, sink: Arc<dyn RecordSink>) {
        self.sink = SinkHandle(Some(sink));
    }
}

#[async_trait]
impl HostPaymentMethod for PaymentMethodRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn canceled(&self) -> bool {
        self.canceled
    }

    fn data(&self) -> &PaymentMethodData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut PaymentMethodData {
        &mut self.data
    }

    fn verified(&self) -> bool {
        self.verified
    }

    fn set_verified(&mut self, verified: bool) {
        self.verified = verified;
    }

    async fn save(&mut self) -> Result<(), CoreError> {
        self.updated_at = Utc::now();
        if let Some(sink) = &self.sink.0 {
            sink.store_payment_method(self)?;
        }
        Ok(())
    }
}

/// A billing transaction with its customer and payment method embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub state: TransactionState,
    pub amount: Amount,
    pub processor: String,
    pub customer: CustomerRecord,
    pub payment_method: PaymentMethodRecord,
    #[serde(default)]
    pub data: TransactionData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_code: Option<FailureCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    sink: SinkHandle,
}

impl TransactionRecord {
    /// Create a transaction in `Initial`, charged through `payment_method`'s processor.
    pub fn new(amount: Amount, customer: CustomerRecord, payment_method: PaymentMethodRecord) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            state: TransactionState::Initial,
            amount,
            processor: payment_method.processor.clone(),
            customer,
            payment_method,
            data: TransactionData::default(),
            external_reference: None,
            fail_code: None,
            fail_reason: None,
            created_at: now,
            updated_at: now,
            sink: SinkHandle::default(),
        }
    }

    /// Attach a sink to the transaction and its payment method.
    pub fn attach_sink(&mut self, sink: Arc<dyn RecordSink>) {
        self.payment_method.attach_sink(Arc::clone(&sink));
        self.sink = SinkHandle(Some(sink));
    }

    fn apply(&mut self, event: TransactionEvent) -> Result<(), CoreError> {
        self.state = TransactionStateMachine::transition(self.state, event)?;
        Ok(())
    }
}

#[async_trait]
impl HostTransaction for TransactionRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> TransactionState {
        self.state
    }

    fn amount(&self) -> &Amount {
        &self.amount
    }

    fn processor(&self) -> &str {
        &self.processor
    }

    fn data(&self) -> &TransactionData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut TransactionData {
        &mut self.data
    }

    fn external_reference(&self) -> Option<&str> {
        self.external_reference.as_deref()
    }

    fn set_external_reference(&mut self, reference: String) {
        self.external_reference = Some(reference);
    }

    fn customer(&self) -> &dyn HostCustomer {
        &self.customer
    }

    fn payment_method(&self) -> &dyn HostPaymentMethod {
        &self.payment_method
    }

    fn payment_method_mut(&mut self) -> &mut dyn HostPaymentMethod {
        &mut self.payment_method
    }

    fn process(&mut self) -> Result<(), CoreError> {
        self.apply(TransactionEvent::Process)
    }

    fn settle(&mut self) -> Result<(), CoreError> {
        self.apply(TransactionEvent::Settle)
    }

    fn cancel(&mut self) -> Result<(), CoreError> {
        self.apply(TransactionEvent::Cancel)
    }

    fn fail(
        &mut self,
        fail_code: Option<FailureCode>,
        fail_reason: Option<String>,
    ) -> Result<(), CoreError> {
        self.apply(TransactionEvent::Fail)?;
        self.fail_code = Some(fail_code.unwrap_or(FailureCode::Default));
        self.fail_reason = fail_reason;
        Ok(())
    }

    async fn save(&mut self) -> Result<(), CoreError> {
        self.updated_at = Utc::now();
        if let Some(sink) = &self.sink.0 {
            sink.store_transaction(self)?;
        }
        Ok(())
    }
}

/// One entry written to a [`SaveJournal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedRecord {
    Transaction { id: Uuid, state: TransactionState },
    PaymentMethod { id: Uuid, verified: bool },
}

/// In-memory sink recording every save in order.
#[derive(Debug, Default)]
pub struct SaveJournal {
    entries: Mutex<Vec<SavedRecord>>,
}

impl SaveJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far.
    pub fn entries(&self) -> Vec<SavedRecord> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, entry: SavedRecord) -> Result<(), CoreError> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Persistence("save journal lock poisoned".into()))?
            .push(entry);
        Ok(())
    }
}

impl RecordSink for SaveJournal {
    fn store_transaction(&self, record: &TransactionRecord) -> Result<(), CoreError> {
        self.push(SavedRecord::Transaction {
            id: record.id,
            state: record.state,
        })
    }

    fn store_payment_method(&self, record: &PaymentMethodRecord) -> Result<(), CoreError> {
        self.push(SavedRecord::PaymentMethod {
            id: record.id,
            verified: record.verified,
        })
    }
}
