use solana_sdk::signature::Signature;
use tracing::{error, info};

use crate::types::VaultOperation;

/// Receives user-facing mutation events. Calls are fire-and-forget and must
/// not block.
pub trait NotificationSink: Send + Sync {
    /// A transaction was submitted and is awaiting confirmation
    fn transaction_pending(&self, operation: VaultOperation, signature: &Signature);

    fn operation_succeeded(&self, operation: VaultOperation, message: &str);

    fn operation_failed(&self, operation: VaultOperation, message: &str);
}

/// Default sink for hosts without a UI: routes events into `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn transaction_pending(&self, operation: VaultOperation, signature: &Signature) {
        info!(%operation, %signature, "transaction sent");
    }

    fn operation_succeeded(&self, operation: VaultOperation, message: &str) {
        info!(%operation, "{}", message);
    }

    fn operation_failed(&self, operation: VaultOperation, message: &str) {
        error!(%operation, "{}", message);
    }
}
