use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::sync::Arc;

use crate::basic::actions::MutationOrchestrator;
use crate::basic::cache::VaultCache;
use crate::basic::reader::StateReader;
use crate::basic::watch::{VaultSubscription, VaultWatcher};
use crate::config::{Cluster, VaultConfig};
use crate::core::connection::SolConnection;
use crate::core::notify::{NotificationSink, TracingSink};
use crate::core::signer::WalletSigner;
use crate::error::Result;
use crate::types::{DerivedAddress, OperationPhase, VaultKey, VaultOperation, VaultSnapshot};
use crate::utils;

/// A user's vault on one cluster: reads, subscriptions and mutations
/// composed from an explicit connection, wallet and cache.
pub struct VaultClient<C, S> {
    config: VaultConfig,
    signer: Arc<S>,
    cache: Arc<VaultCache>,
    reader: Arc<StateReader<C>>,
    orchestrator: MutationOrchestrator<C, S>,
}

impl<C, S> VaultClient<C, S>
where
    C: SolConnection + 'static,
    S: WalletSigner,
{
    /// Client with a private cache and `TracingSink` notifications
    pub fn new(config: VaultConfig, connection: Arc<C>, signer: Arc<S>) -> Self {
        Self::with_parts(
            config,
            connection,
            signer,
            Arc::new(TracingSink),
            Arc::new(VaultCache::new()),
        )
    }

    /// Client sharing `cache` with other clients (one per cluster) and
    /// reporting to `sink`
    pub fn with_parts(
        config: VaultConfig,
        connection: Arc<C>,
        signer: Arc<S>,
        sink: Arc<dyn NotificationSink>,
        cache: Arc<VaultCache>,
    ) -> Self {
        let reader = Arc::new(StateReader::new(Arc::clone(&connection), &config));
        let orchestrator = MutationOrchestrator::new(
            &config,
            connection,
            Arc::clone(&signer),
            sink,
            Arc::clone(&cache),
        );

        Self {
            config,
            signer,
            cache,
            reader,
            orchestrator,
        }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn cluster(&self) -> &Cluster {
        &self.config.cluster
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.config.program_id
    }

    pub fn cache(&self) -> &Arc<VaultCache> {
        &self.cache
    }

    pub fn reader(&self) -> &StateReader<C> {
        &self.reader
    }

    pub fn mutations(&self) -> &MutationOrchestrator<C, S> {
        &self.orchestrator
    }

    /// The connected owner, if any
    pub fn owner(&self) -> Option<Pubkey> {
        self.signer.pubkey()
    }

    /// Cache key for the connected owner
    pub fn key(&self) -> Option<VaultKey> {
        self.owner()
            .map(|owner| VaultKey::new(self.config.cluster.clone(), owner))
    }

    pub fn vault_pda(&self, owner: &Pubkey) -> Result<DerivedAddress> {
        utils::derive_vault_pda(&self.config.program_id, owner)
    }

    pub fn vault_state_pda(&self, owner: &Pubkey) -> Result<DerivedAddress> {
        utils::derive_state_pda(&self.config.program_id, owner)
    }

    /// One-off read of the connected owner's vault
    pub async fn read(&self) -> VaultSnapshot {
        self.reader.read_vault_view(self.owner().as_ref()).await
    }

    pub async fn program_account(&self) -> Result<Option<Account>> {
        self.reader.program_account().await
    }

    pub fn watcher(&self) -> VaultWatcher<C> {
        VaultWatcher::new(
            Arc::clone(&self.reader),
            Arc::clone(&self.cache),
            self.config.cluster.clone(),
            self.config.poll_interval(),
        )
    }

    /// Poll the connected owner's vault until the subscription is dropped
    pub fn subscribe(&self) -> VaultSubscription {
        self.watcher().subscribe(self.owner())
    }

    pub async fn initialize(&self) -> Result<Signature> {
        self.orchestrator.initialize().await
    }

    pub async fn deposit(&self, amount: f64) -> Result<Signature> {
        self.orchestrator.deposit(amount).await
    }

    pub async fn withdraw(&self, amount: f64) -> Result<Signature> {
        self.orchestrator.withdraw(amount).await
    }

    pub async fn close(&self) -> Result<Signature> {
        self.orchestrator.close().await
    }

    pub fn phase(&self, operation: VaultOperation) -> OperationPhase {
        self.orchestrator.phase(operation)
    }
}
