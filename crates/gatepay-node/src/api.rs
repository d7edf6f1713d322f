//! HTTP API server for the Gatepay node.
//!
//! Provides REST endpoints for creating and driving gateway transactions,
//! client tokens for the checkout page and the checkout callback.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use gatepay_core::{
    Amount, CustomerRecord, FailureCode, HostPaymentMethod, HostTransaction, InstrumentDetails,
    PaymentMethodRecord, TransactionRecord, TransactionState,
};
use gatepay_processor::{CallbackFields, CallbackOutcome, ProcessorError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

use crate::state::NodeState;

const NOT_GATEWAY_TRANSACTION: &str = "Transaction is not a gateway transaction.";
const GATEWAY_MISCOMMUNICATION: &str = "Gateway miscommunication.";
const TRANSACTION_NOT_FOUND: &str = "Transaction not found.";

// --- Request / response types ---

#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub gateway: String,
    pub environment: String,
    pub processors: Vec<String>,
    pub uptime_secs: u64,
}

#[derive(Deserialize)]
pub struct CustomerInput {
    /// Reuse an existing customer id; a new one is assigned when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct CreateTransactionRequest {
    pub processor: String,
    pub amount: u128,
    pub currency: String,
    pub customer: CustomerInput,
    /// Charge an existing payment method instead of starting a new one.
    #[serde(default)]
    pub payment_method_id: Option<Uuid>,
}

/// Payment method as shown over the API; credentials are reduced to flags.
#[derive(Serialize, Deserialize)]
pub struct PaymentMethodView {
    pub id: Uuid,
    pub processor: String,
    pub canceled: bool,
    pub verified: bool,
    pub has_token: bool,
    pub has_nonce: bool,
    pub gateway_reference_id: Option<String>,
    pub status: Option<String>,
    pub details: InstrumentDetails,
}

#[derive(Serialize, Deserialize)]
pub struct TransactionView {
    pub id: Uuid,
    pub state: TransactionState,
    pub amount: Amount,
    pub processor: String,
    pub customer_id: Uuid,
    pub external_reference: Option<String>,
    pub gateway_status: Option<String>,
    pub error_codes: Option<Vec<u32>>,
    pub fail_code: Option<FailureCode>,
    pub fail_reason: Option<String>,
    pub payment_method: PaymentMethodView,
}

#[derive(Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub transaction: TransactionView,
}

#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

fn internal(e: anyhow::Error) -> ApiError {
    tracing::error!(error = %e, "Storage failure");
    error(StatusCode::INTERNAL_SERVER_ERROR, "storage failure")
}

fn plain_text((status, Json(body)): ApiError) -> (StatusCode, String) {
    (status, body.detail)
}

fn processor_error(e: ProcessorError) -> ApiError {
    let status = match &e {
        ProcessorError::ProcessorNotFound(_) => {
            return error(StatusCode::BAD_REQUEST, NOT_GATEWAY_TRANSACTION)
        }
        ProcessorError::TransitionRefused { .. } => StatusCode::CONFLICT,
        ProcessorError::Gateway(_) => StatusCode::BAD_GATEWAY,
        ProcessorError::Host(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(error = %e, "Processor operation failed");
    error(status, e.to_string())
}

impl From<&TransactionRecord> for TransactionView {
    fn from(record: &TransactionRecord) -> Self {
        let payment_method = &record.payment_method;
        Self {
            id: record.id,
            state: record.state,
            amount: record.amount.clone(),
            processor: record.processor.clone(),
            customer_id: record.customer.id,
            external_reference: record.external_reference.clone(),
            gateway_status: record.data.status.clone(),
            error_codes: record.data.error_codes.clone(),
            fail_code: record.fail_code,
            fail_reason: record.fail_reason.clone(),
            payment_method: PaymentMethodView {
                id: payment_method.id,
                processor: payment_method.processor.clone(),
                canceled: payment_method.canceled,
                verified: payment_method.verified,
                has_token: payment_method.data.token.is_some(),
                has_nonce: payment_method.data.nonce.is_some(),
                gateway_reference_id: payment_method.data.gateway_reference_id.clone(),
                status: payment_method.data.status.clone(),
                details: payment_method.data.details.clone(),
            },
        }
    }
}

fn load_transaction(state: &NodeState, id: Uuid) -> Result<TransactionRecord, ApiError> {
    state
        .storage
        .load_transaction(id)
        .map_err(internal)?
        .ok_or_else(|| error(StatusCode::NOT_FOUND, TRANSACTION_NOT_FOUND))
}

// --- Handlers ---

async fn handle_status(State(state): State<Arc<NodeState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        gateway: state.gateway_id.clone(),
        environment: state.environment.to_string(),
        processors: state.registry.names(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn handle_create_transaction(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionView>), ApiError> {
    if !state.registry.contains(&req.processor) {
        return Err(error(StatusCode::BAD_REQUEST, "Unknown processor."));
    }

    let existing = match req.payment_method_id {
        Some(id) => Some(
            state
                .storage
                .get_payment_method(id)
                .map_err(internal)?
                .ok_or_else(|| error(StatusCode::NOT_FOUND, "Payment method not found."))?,
        ),
        None => None,
    };

    let customer_id = req
        .customer
        .id
        .or(existing.as_ref().map(|pm| pm.customer_id))
        .unwrap_or_else(Uuid::now_v7);
    let payment_method = match existing {
        Some(pm) if pm.customer_id != customer_id => {
            return Err(error(
                StatusCode::BAD_REQUEST,
                "Payment method belongs to another customer.",
            ))
        }
        Some(pm) if pm.processor != req.processor => {
            return Err(error(
                StatusCode::BAD_REQUEST,
                "Payment method belongs to another processor.",
            ))
        }
        Some(pm) if pm.canceled => {
            return Err(error(StatusCode::BAD_REQUEST, "Payment method was canceled."))
        }
        Some(pm) => pm,
        None => PaymentMethodRecord::new(customer_id, req.processor.clone()),
    };

    let customer = CustomerRecord {
        id: customer_id,
        first_name: req.customer.first_name,
        last_name: req.customer.last_name,
    };
    let mut tx = TransactionRecord::new(
        Amount::new(req.amount, req.currency),
        customer,
        payment_method,
    );
    tx.attach_sink(state.storage.clone());
    tx.payment_method_mut()
        .save()
        .await
        .map_err(|e| processor_error(e.into()))?;
    tx.save().await.map_err(|e| processor_error(e.into()))?;

    tracing::info!(
        transaction_id = %tx.id,
        processor = %tx.processor,
        amount = %tx.amount,
        "Transaction created"
    );
    Ok((StatusCode::CREATED, Json(TransactionView::from(&tx))))
}

async fn handle_get_transaction(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ApiError> {
    let tx = load_transaction(&state, id)?;
    Ok(Json(TransactionView::from(&tx)))
}

async fn handle_execute(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let mut tx = load_transaction(&state, id)?;
    let success = state
        .registry
        .execute_transaction(&mut tx)
        .await
        .map_err(processor_error)?;
    Ok(Json(ActionResponse {
        success,
        transaction: TransactionView::from(&tx),
    }))
}

async fn handle_fetch_status(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let mut tx = load_transaction(&state, id)?;
    let success = state
        .registry
        .fetch_transaction_status(&mut tx)
        .await
        .map_err(processor_error)?;
    Ok(Json(ActionResponse {
        success,
        transaction: TransactionView::from(&tx),
    }))
}

async fn handle_client_token(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TokenResponse>, ApiError> {
    let tx = load_transaction(&state, id)?;
    let processor = state
        .registry
        .for_transaction(&tx)
        .map_err(|_| error(StatusCode::BAD_REQUEST, NOT_GATEWAY_TRANSACTION))?;

    match processor
        .client_token(&tx.customer)
        .await
        .map_err(processor_error)?
    {
        Some(token) => Ok(Json(TokenResponse { token })),
        None => Err(error(
            StatusCode::SERVICE_UNAVAILABLE,
            GATEWAY_MISCOMMUNICATION,
        )),
    }
}

/// Checkout callback. Every response, errors included, is plain text.
async fn handle_callback(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<Uuid>,
    Form(fields): Form<CallbackFields>,
) -> (StatusCode, String) {
    let mut tx = match load_transaction(&state, id) {
        Ok(tx) => tx,
        Err(e) => return plain_text(e),
    };
    let outcome = match state
        .registry
        .handle_transaction_response(&mut tx, fields)
        .await
    {
        Ok(outcome) => outcome,
        Err(e @ ProcessorError::ProcessorNotFound(_)) => return plain_text(processor_error(e)),
        Err(e) => {
            let (status, _) = processor_error(e);
            return (status, CallbackOutcome::ChargeFailed.message().to_string());
        }
    };

    let status = if outcome.is_rejection() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, outcome.message().to_string())
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/transactions", post(handle_create_transaction))
        .route("/api/v1/transactions/{id}", get(handle_get_transaction))
        .route("/api/v1/transactions/{id}/execute", post(handle_execute))
        .route("/api/v1/transactions/{id}/status", post(handle_fetch_status))
        .route(
            "/api/v1/transactions/{id}/client-token",
            get(handle_client_token),
        )
        .route("/api/v1/transactions/{id}/callback", post(handle_callback))
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: SocketAddr,
    state: Arc<NodeState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
