use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::error::Error;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::config::VaultConfig;
use crate::core::connection::SolConnection;

/// `SolConnection` over a JSON-RPC endpoint
pub struct RpcConnection {
    client: RpcClient,
    confirm_timeout: Duration,
    confirm_poll_interval: Duration,
}

impl RpcConnection {
    pub fn new(config: &VaultConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(config.rpc_url(), CommitmentConfig::confirmed()),
            confirm_timeout: config.confirm_timeout(),
            confirm_poll_interval: config.confirm_poll_interval(),
        }
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }
}

#[async_trait]
impl SolConnection for RpcConnection {
    async fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<Signature, Box<dyn Error + Send + Sync>> {
        Ok(self.client.send_transaction(tx).await?)
    }

    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn Error + Send + Sync>> {
        let response = self
            .client
            .get_account_with_commitment(pubkey, self.client.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, Box<dyn Error + Send + Sync>> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let deadline = Instant::now() + self.confirm_timeout;
        loop {
            match self
                .client
                .get_signature_status_with_commitment(signature, commitment)
                .await?
            {
                Some(Ok(())) => return Ok(()),
                Some(Err(err)) => return Err(err.into()),
                None => debug!(%signature, "signature not yet at requested commitment"),
            }

            if Instant::now() >= deadline {
                return Err(format!(
                    "signature {} not confirmed within {:?}",
                    signature, self.confirm_timeout
                )
                .into());
            }
            tokio::time::sleep(self.confirm_poll_interval).await;
        }
    }
}

/// Program logs from a failed preflight simulation, if the error carries any
pub fn preflight_logs(err: &ClientError) -> Vec<String> {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data: RpcResponseErrorData::SendTransactionPreflightFailure(result),
            ..
        }) => result.logs.clone().unwrap_or_default(),
        _ => Vec::new(),
    }
}
