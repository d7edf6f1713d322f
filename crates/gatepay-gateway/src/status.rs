use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction status as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
    AuthorizationExpired,
    Authorized,
    Authorizing,
    SettlementPending,
    SettlementDeclined,
    SettlementFailed,
    SettlementConfirmed,
    Failed,
    GatewayRejected,
    ProcessorDeclined,
    Settled,
    Settling,
    SubmittedForSettlement,
    Voided,
    #[serde(other)]
    Unrecognized,
}

impl GatewayStatus {
    pub const ALL: [GatewayStatus; 15] = [
        Self::AuthorizationExpired,
        Self::Authorized,
        Self::Authorizing,
        Self::SettlementPending,
        Self::SettlementDeclined,
        Self::SettlementFailed,
        Self::SettlementConfirmed,
        Self::Failed,
        Self::GatewayRejected,
        Self::ProcessorDeclined,
        Self::Settled,
        Self::Settling,
        Self::SubmittedForSettlement,
        Self::Voided,
        Self::Unrecognized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationExpired => "authorization_expired",
            Self::Authorized => "authorized",
            Self::Authorizing => "authorizing",
            Self::SettlementPending => "settlement_pending",
            Self::SettlementDeclined => "settlement_declined",
            Self::SettlementFailed => "settlement_failed",
            Self::SettlementConfirmed => "settlement_confirmed",
            Self::Failed => "failed",
            Self::GatewayRejected => "gateway_rejected",
            Self::ProcessorDeclined => "processor_declined",
            Self::Settled => "settled",
            Self::Settling => "settling",
            Self::SubmittedForSettlement => "submitted_for_settlement",
            Self::Voided => "voided",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Parse a status string; unknown values map to `Unrecognized`.
    pub fn parse(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .unwrap_or(Self::Unrecognized)
    }

    /// Statuses that end the transaction as failed on the host.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationExpired
                | Self::SettlementDeclined
                | Self::Failed
                | Self::GatewayRejected
                | Self::ProcessorDeclined
        )
    }

    /// Statuses that count as settled on the host.
    pub fn is_settlement(&self) -> bool {
        matches!(
            self,
            Self::Settling | Self::SettlementPending | Self::Settled
        )
    }

    pub fn is_voided(&self) -> bool {
        matches!(self, Self::Voided)
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
