use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{ClientTokenRequest, GatewayTransaction, SaleRequest, SaleResult};

/// Payment gateway interface.
///
/// Each call is a single request/response exchange; implementations own
/// transport, authentication and timeouts.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Look up a transaction by gateway id. Unknown ids yield `NotFound`.
    async fn find(&self, transaction_id: &str) -> Result<GatewayTransaction, GatewayError>;

    /// Submit a sale. Declines come back as `Ok` with `is_success == false`;
    /// `Err` means the gateway could not be asked.
    async fn sale(&self, request: SaleRequest) -> Result<SaleResult, GatewayError>;

    /// Generate a token for the client-side checkout SDK.
    async fn generate_client_token(
        &self,
        request: ClientTokenRequest,
    ) -> Result<String, GatewayError>;

    /// Return the unique identifier of this gateway client (e.g. "gw-sandbox").
    fn gateway_id(&self) -> &str;
}
