//! State-changing vault operations.
//!
//! Each call runs Idle -> Submitting -> AwaitingConfirmation -> Succeeded or
//! Failed. Success is reported once the signature is confirmed; the cache
//! invalidation that follows runs after the settle delay, detached from the
//! caller. Nothing is retried here.

use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::advanced::builders::TransactionBuilder;
use crate::advanced::instructions::{self, VaultAccounts};
use crate::basic::cache::VaultCache;
use crate::config::{Cluster, VaultConfig};
use crate::core::connection::SolConnection;
use crate::core::constants::CONFIRMATION_LEVEL;
use crate::core::notify::NotificationSink;
use crate::core::signer::WalletSigner;
use crate::error::{Result, VaultSdkError};
use crate::types::{OperationPhase, VaultKey, VaultOperation};
use crate::utils;

pub struct MutationOrchestrator<C, S> {
    connection: Arc<C>,
    signer: Arc<S>,
    sink: Arc<dyn NotificationSink>,
    cache: Arc<VaultCache>,
    program_id: Pubkey,
    cluster: Cluster,
    settle_delay: Duration,
    phases: [watch::Sender<OperationPhase>; 4],
}

impl<C: SolConnection, S: WalletSigner> MutationOrchestrator<C, S> {
    pub fn new(
        config: &VaultConfig,
        connection: Arc<C>,
        signer: Arc<S>,
        sink: Arc<dyn NotificationSink>,
        cache: Arc<VaultCache>,
    ) -> Self {
        Self {
            connection,
            signer,
            sink,
            cache,
            program_id: config.program_id,
            cluster: config.cluster.clone(),
            settle_delay: config.settle_delay(),
            phases: std::array::from_fn(|_| watch::channel(OperationPhase::Idle).0),
        }
    }

    /// Create the vault state record
    pub async fn initialize(&self) -> Result<Signature> {
        self.run(VaultOperation::Initialize, None).await
    }

    /// Deposit `amount` SOL, rounded down to whole lamports
    pub async fn deposit(&self, amount: f64) -> Result<Signature> {
        self.run(VaultOperation::Deposit, Some(amount)).await
    }

    /// Withdraw `amount` SOL, rounded down to whole lamports
    pub async fn withdraw(&self, amount: f64) -> Result<Signature> {
        self.run(VaultOperation::Withdraw, Some(amount)).await
    }

    /// Drain the vault back to the owner and destroy its state record
    pub async fn close(&self) -> Result<Signature> {
        self.run(VaultOperation::Close, None).await
    }

    /// Current phase of `operation`
    pub fn phase(&self, operation: VaultOperation) -> OperationPhase {
        self.phases[operation.index()].borrow().clone()
    }

    pub fn watch_phase(&self, operation: VaultOperation) -> watch::Receiver<OperationPhase> {
        self.phases[operation.index()].subscribe()
    }

    async fn run(&self, operation: VaultOperation, amount: Option<f64>) -> Result<Signature> {
        let result = self.execute(operation, amount).await;

        match &result {
            Ok(signature) => {
                self.set_phase(operation, OperationPhase::Succeeded(*signature));
                self.sink
                    .operation_succeeded(operation, operation.success_message());
            },
            Err(err) => {
                let message = operation.failure_message(&err.to_string());
                error!(%operation, error = %err, logs = ?err.logs(), "vault operation failed");
                self.set_phase(operation, OperationPhase::Failed(err.to_string()));
                self.sink.operation_failed(operation, &message);
            },
        }

        result
    }

    async fn execute(&self, operation: VaultOperation, amount: Option<f64>) -> Result<Signature> {
        let owner = self.signer.pubkey().ok_or(VaultSdkError::NotConnected)?;
        let lamports = amount.map(utils::sol_to_lamports).transpose()?.unwrap_or(0);

        let accounts = VaultAccounts::derive(&self.program_id, &owner)?;
        let ix = instructions::for_operation(&self.program_id, &accounts, operation, lamports)?;

        self.set_phase(operation, OperationPhase::Submitting);
        let tx = TransactionBuilder::new(owner)
            .add_instruction(ix)
            .build_transaction(self.connection.as_ref())
            .await?;

        let signature = self.signer.sign_and_send(tx).await?;
        info!(%operation, %owner, %signature, lamports, "vault transaction submitted");
        self.sink.transaction_pending(operation, &signature);

        self.set_phase(operation, OperationPhase::AwaitingConfirmation(signature));
        self.connection
            .confirm_transaction(
                &signature,
                CommitmentConfig {
                    commitment: CONFIRMATION_LEVEL,
                },
            )
            .await
            .map_err(|e| VaultSdkError::ConfirmationFailed {
                message: e.to_string(),
            })?;
        info!(%operation, %signature, "vault transaction confirmed");

        self.schedule_invalidation(VaultKey::new(self.cluster.clone(), owner));
        Ok(signature)
    }

    /// Invalidate the owner's view once the settle delay has passed, giving
    /// read replicas time to catch up with the confirmed write
    fn schedule_invalidation(&self, key: VaultKey) {
        let cache = Arc::clone(&self.cache);
        let delay = self.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(%key, "settle delay elapsed");
            cache.invalidate(&key);
        });
    }

    fn set_phase(&self, operation: VaultOperation, phase: OperationPhase) {
        self.phases[operation.index()].send_replace(phase);
    }
}
