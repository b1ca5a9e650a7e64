use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::LedgerResult;

/// Credentials for the push-notification provider, passed in explicitly
/// rather than read from ambient process state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub api_key: String,
    pub app_id: String,
}

/// Outbound notification transport.
///
/// Implementations deliver a short titled message to one user. Callers treat
/// failures as non-fatal: they log and move on, never abort the operation
/// that triggered the notification.
pub trait DeliveryGateway: Send + Sync {
    fn send(&self, user_id: Uuid, title: &str, body: &str) -> LedgerResult<()>;
}

/// Gateway that records deliveries in the log only. Stands in for the real
/// push provider in development.
pub struct LoggingGateway {
    config: DeliveryConfig,
}

impl LoggingGateway {
    pub fn new(config: DeliveryConfig) -> Self {
        Self { config }
    }
}

impl DeliveryGateway for LoggingGateway {
    fn send(&self, user_id: Uuid, title: &str, body: &str) -> LedgerResult<()> {
        info!(%user_id, app = %self.config.app_id, title, body, "notification dispatched");
        Ok(())
    }
}
