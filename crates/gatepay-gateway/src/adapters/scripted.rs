use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::error::GatewayError;
use crate::traits::Gateway;
use crate::types::{ClientTokenRequest, GatewayTransaction, SaleRequest, SaleResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Gateway double that replays queued responses and records every request.
///
/// A call with nothing queued fails with `GatewayError::Other`.
#[derive(Default)]
pub struct ScriptedGateway {
    sales: Mutex<VecDeque<Result<SaleResult, GatewayError>>>,
    finds: Mutex<VecDeque<Result<GatewayTransaction, GatewayError>>>,
    client_tokens: Mutex<VecDeque<Result<String, GatewayError>>>,
    sale_requests: Mutex<Vec<SaleRequest>>,
    find_requests: Mutex<Vec<String>>,
    client_token_requests: Mutex<Vec<ClientTokenRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_sale(&self, response: Result<SaleResult, GatewayError>) -> &Self {
        lock(&self.sales).push_back(response);
        self
    }

    pub fn push_find(&self, response: Result<GatewayTransaction, GatewayError>) -> &Self {
        lock(&self.finds).push_back(response);
        self
    }

    pub fn push_client_token(&self, response: Result<String, GatewayError>) -> &Self {
        lock(&self.client_tokens).push_back(response);
        self
    }

    pub fn sale_requests(&self) -> Vec<SaleRequest> {
        lock(&self.sale_requests).clone()
    }

    pub fn find_requests(&self) -> Vec<String> {
        lock(&self.find_requests).clone()
    }

    pub fn client_token_requests(&self) -> Vec<ClientTokenRequest> {
        lock(&self.client_token_requests).clone()
    }

    /// Total number of gateway calls of any kind.
    pub fn call_count(&self) -> usize {
        lock(&self.sale_requests).len()
            + lock(&self.find_requests).len()
            + lock(&self.client_token_requests).len()
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn find(&self, transaction_id: &str) -> Result<GatewayTransaction, GatewayError> {
        lock(&self.find_requests).push(transaction_id.to_string());
        lock(&self.finds)
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Other("no scripted response for find".into())))
    }

    async fn sale(&self, request: SaleRequest) -> Result<SaleResult, GatewayError> {
        lock(&self.sale_requests).push(request);
        lock(&self.sales)
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Other("no scripted response for sale".into())))
    }

    async fn generate_client_token(
        &self,
        request: ClientTokenRequest,
    ) -> Result<String, GatewayError> {
        lock(&self.client_token_requests).push(request);
        lock(&self.client_tokens).pop_front().unwrap_or_else(|| {
            Err(GatewayError::Other(
                "no scripted response for client token".into(),
            ))
        })
    }

    fn gateway_id(&self) -> &str {
        "gw-scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_and_records() {
        let gw = ScriptedGateway::new();
        gw.push_client_token(Ok("first".into()))
            .push_client_token(Err(GatewayError::Authentication));

        let request = ClientTokenRequest {
            customer_id: Some("cust_1".into()),
        };
        assert_eq!(
            gw.generate_client_token(request.clone()).await.unwrap(),
            "first"
        );
        assert_eq!(
            gw.generate_client_token(request.clone()).await.unwrap_err(),
            GatewayError::Authentication
        );
        assert_eq!(gw.client_token_requests(), vec![request.clone(), request]);
        assert_eq!(gw.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_queue_is_an_error() {
        let gw = ScriptedGateway::new();
        let err = gw.find("abc").await.unwrap_err();
        assert!(matches!(err, GatewayError::Other(_)));
        assert_eq!(gw.find_requests(), vec!["abc".to_string()]);
    }
}
