use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use thiserror::Error;

use crate::core::connection::SolConnection;
use crate::core::rpc;

/// Signing or submission failure, with any program logs from preflight
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SignerError {
    pub message: String,
    pub logs: Vec<String>,
}

impl SignerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            logs: Vec::new(),
        }
    }

    pub fn with_logs(mut self, logs: Vec<String>) -> Self {
        self.logs = logs;
        self
    }

    /// Recover message and logs from a connection error
    pub fn from_boxed(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        if let Some(signer_err) = err.downcast_ref::<SignerError>() {
            return signer_err.clone();
        }
        if let Some(client_err) = err.downcast_ref::<ClientError>() {
            return Self::new(client_err.to_string()).with_logs(rpc::preflight_logs(client_err));
        }
        Self::new(err.to_string())
    }
}

/// Wallet capability: the connected owner and a way to sign and submit.
/// This allows the SDK to work with:
/// 1. Local Keypairs (Backend/CLI)
/// 2. Wallet Adapters (Frontend flows that sign and send on the user's behalf)
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// The connected owner, or `None` when no wallet is connected
    fn pubkey(&self) -> Option<Pubkey>;

    /// Sign an assembled transaction and submit it, returning its signature.
    async fn sign_and_send(&self, tx: Transaction) -> Result<Signature, SignerError>;
}

/// Signs with a local keypair and submits through a connection
pub struct KeypairSigner<C> {
    keypair: Keypair,
    connection: Arc<C>,
}

impl<C: SolConnection> KeypairSigner<C> {
    pub fn new(keypair: Keypair, connection: Arc<C>) -> Self {
        Self {
            keypair,
            connection,
        }
    }
}

#[async_trait]
impl<C: SolConnection> WalletSigner for KeypairSigner<C> {
    fn pubkey(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn sign_and_send(&self, mut tx: Transaction) -> Result<Signature, SignerError> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|e| SignerError::new(e.to_string()))?;

        self.connection
            .send_transaction(&tx)
            .await
            .map_err(SignerError::from_boxed)
    }
}

/// A wallet slot with nothing connected
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSigner;

#[async_trait]
impl WalletSigner for DetachedSigner {
    fn pubkey(&self) -> Option<Pubkey> {
        None
    }

    async fn sign_and_send(&self, _tx: Transaction) -> Result<Signature, SignerError> {
        Err(SignerError::new("Wallet not connected"))
    }
}
