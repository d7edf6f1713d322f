//! Gatepay gateway layer
//!
//! The narrow contract the processor needs from the payment gateway
//! (`find`, `sale`, `generate_client_token`), the gateway's transaction
//! status vocabulary, and adapters: an in-process sandbox and a scripted
//! test double.

pub mod error;
pub mod config;
pub mod status;
pub mod types;
pub mod traits;
pub mod adapters;

pub use config::{Environment, GatewayConfig};
pub use error::GatewayError;
pub use status::GatewayStatus;
pub use traits::Gateway;
pub use types::{
    Billing, CardVerification, ClientTokenRequest, CreditCardDetails, CustomerDetails,
    GatewayTransaction, PayPalDetails, SaleCredential, SaleCustomer, SaleOptions, SaleRequest,
    SaleResult, ValidationError,
};
