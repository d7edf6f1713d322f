//! Sale submission for a transaction that has entered `Pending`.

use gatepay_core::{
    Amount, FailureCode, HostCustomer, HostPaymentMethod, HostTransaction, InstrumentDetails,
    InstrumentType, PaymentMethodData, Secret,
};
use gatepay_gateway::{
    Billing, GatewayTransaction, SaleCredential, SaleCustomer, SaleOptions, SaleRequest,
    SaleResult,
};

use crate::error::ProcessorError;
use crate::failure_codes::failure_code;
use crate::processor::{fail_ignoring_refusal, GatewayProcessor};
use crate::translate::update_transaction_status;

const CANCELED_REASON: &str = "Payment method was canceled.";
const NO_CREDENTIAL_REASON: &str = "Payment method has no token or nonce.";
const UNSUPPORTED_INSTRUMENT_REASON: &str = "Not a supported instrument_type";

/// Build the sale for `amount` against `payment_method`.
///
/// A token is preferred over a nonce. Returns `None` when the method carries
/// neither.
pub fn build_sale_request(
    amount: &Amount,
    payment_method: &PaymentMethodData,
    customer: &dyn HostCustomer,
    vault_id: Option<String>,
    recurring: bool,
) -> Option<SaleRequest> {
    let (credential, store_in_vault) = match (&payment_method.token, &payment_method.nonce) {
        (Some(token), _) => (SaleCredential::PaymentMethodToken(token.clone()), None),
        (None, Some(nonce)) => (
            SaleCredential::PaymentMethodNonce(nonce.clone()),
            Some(recurring),
        ),
        (None, None) => return None,
    };

    let customer = match vault_id {
        Some(customer_id) => SaleCustomer::Existing { customer_id },
        None => SaleCustomer::New {
            first_name: customer.first_name().to_string(),
            last_name: customer.last_name().to_string(),
        },
    };

    Some(SaleRequest {
        amount: amount.clone(),
        credential,
        billing: Billing {
            postal_code: payment_method.details.postal_code.clone(),
        },
        customer,
        options: SaleOptions {
            submit_for_settlement: true,
            store_in_vault,
        },
    })
}

/// Public details and vault token carried by an accepted sale.
fn instrument_payload(
    instrument_type: InstrumentType,
    result: &GatewayTransaction,
) -> (InstrumentDetails, Option<Secret>) {
    let mut details = InstrumentDetails {
        instrument_type: Some(instrument_type),
        ..InstrumentDetails::default()
    };
    let token = match instrument_type {
        InstrumentType::PayPal => {
            let paypal = result.paypal_details.clone().unwrap_or_default();
            details.image_url = paypal.image_url;
            details.email = paypal.payer_email;
            paypal.token
        }
        InstrumentType::CreditCard => {
            let card = result.credit_card_details.clone().unwrap_or_default();
            details.image_url = card.image_url;
            details.card_type = card.card_type;
            details.last_4 = card.last_4;
            card.token
        }
    };
    (details, token)
}

impl GatewayProcessor {
    /// Submit the sale for `transaction` and translate the gateway's answer.
    pub(crate) async fn charge_transaction(
        &self,
        transaction: &mut dyn HostTransaction,
    ) -> Result<bool, ProcessorError> {
        if transaction.payment_method().canceled() {
            fail_ignoring_refusal(transaction, None, Some(CANCELED_REASON.into())).await?;
            return Ok(false);
        }

        let customer_id = transaction.customer().id();
        let vault_id = self.vault_links.vault_id(customer_id).await?;
        let Some(request) = build_sale_request(
            transaction.amount(),
            transaction.payment_method().data(),
            transaction.customer(),
            vault_id,
            self.config.recurring,
        ) else {
            tracing::warn!(
                transaction_id = %transaction.id(),
                payment_method_id = %transaction.payment_method().id(),
                "Token or nonce not found when charging payment method"
            );
            fail_ignoring_refusal(transaction, None, Some(NO_CREDENTIAL_REASON.into())).await?;
            return Ok(false);
        };

        let result = self.gateway.sale(request).await?;
        let accepted = match result.transaction.as_ref() {
            Some(accepted) if result.is_success => accepted.clone(),
            _ => return self.record_rejection(transaction, &result).await,
        };

        if self
            .vault_links
            .link_if_absent(customer_id, &accepted.customer_details.id)
            .await?
        {
            tracing::info!(
                %customer_id,
                vault_id = %accepted.customer_details.id,
                "Linked customer to gateway vault"
            );
        }

        let Some(instrument_type) = InstrumentType::from_gateway(&accepted.payment_instrument_type)
        else {
            tracing::warn!(
                transaction_id = %transaction.id(),
                instrument_type = %accepted.payment_instrument_type,
                "Gateway charged an unsupported instrument"
            );
            fail_ignoring_refusal(
                transaction,
                Some(FailureCode::InvalidPaymentMethod),
                Some(UNSUPPORTED_INSTRUMENT_REASON.into()),
            )
            .await?;
            return Ok(false);
        };

        self.update_payment_method(transaction.payment_method_mut(), instrument_type, &accepted)
            .await?;

        let outcome = update_transaction_status(transaction, &accepted).await;
        self.apply_refusal_policy(outcome)
    }

    /// Record a declined or rejected sale on the transaction.
    async fn record_rejection(
        &self,
        transaction: &mut dyn HostTransaction,
        result: &SaleResult,
    ) -> Result<bool, ProcessorError> {
        let errors = result.error_codes();
        tracing::warn!(
            transaction_id = %transaction.id(),
            message = result.message.as_deref().unwrap_or_default(),
            errors = ?errors,
            customer_id = %transaction.customer().id(),
            card_verification = ?result.credit_card_verification,
            "Couldn't charge gateway transaction"
        );

        transaction.data_mut().error_codes = errors.clone();
        let fail_code = result
            .transaction
            .as_ref()
            .map(failure_code)
            .unwrap_or(FailureCode::Default);
        let reason = match errors {
            Some(codes) => Some(
                codes
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            None => result.message.clone(),
        };

        fail_ignoring_refusal(transaction, Some(fail_code), reason).await?;
        Ok(false)
    }

    /// Capture instrument details and, for a recurring processor, the vault token.
    ///
    /// Saved before the transaction so an interrupted charge leaves the method
    /// updated and the transaction `Pending`.
    async fn update_payment_method(
        &self,
        payment_method: &mut dyn HostPaymentMethod,
        instrument_type: InstrumentType,
        accepted: &GatewayTransaction,
    ) -> Result<(), ProcessorError> {
        let (details, token) = instrument_payload(instrument_type, accepted);

        let data = payment_method.data_mut();
        data.details.merge(details);
        data.gateway_reference_id = Some(accepted.id.clone());
        data.status = Some(accepted.status.as_str().to_string());

        let captured = match token {
            Some(token) if self.config.recurring => {
                data.capture_token(token);
                true
            }
            _ => false,
        };
        if captured {
            payment_method.set_verified(true);
        }

        payment_method.save().await?;
        Ok(())
    }
}
