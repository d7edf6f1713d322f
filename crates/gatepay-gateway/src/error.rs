/// Errors raised by a gateway client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway authentication failed")]
    Authentication,

    #[error("gateway authorization failed")]
    Authorization,

    #[error("gateway is down for maintenance")]
    DownForMaintenance,

    #[error("gateway server error: {0}")]
    Server(String),

    #[error("gateway client upgrade required")]
    UpgradeRequired,

    #[error("gateway record not found: {0}")]
    NotFound(String),

    #[error("invalid gateway request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    /// Failures talking to the gateway, as opposed to answers from it.
    pub fn is_communication_failure(&self) -> bool {
        matches!(
            self,
            Self::Authentication
                | Self::Authorization
                | Self::DownForMaintenance
                | Self::Server(_)
                | Self::UpgradeRequired
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
