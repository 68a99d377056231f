use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::VaultConfig;
use crate::core::connection::SolConnection;
use crate::error::{Result, VaultSdkError};
use crate::types::{VaultSnapshot, VaultView};
use crate::utils;

/// Reads and assembles consolidated vault views
pub struct StateReader<C> {
    connection: Arc<C>,
    program_id: Pubkey,
    read_retries: u32,
    retry_base_delay: Duration,
}

impl<C: SolConnection> StateReader<C> {
    pub fn new(connection: Arc<C>, config: &VaultConfig) -> Self {
        Self {
            connection,
            program_id: config.program_id,
            read_retries: config.read_retries,
            retry_base_delay: config.retry_base_delay(),
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Read the owner's vault, retrying transport failures.
    ///
    /// Never fails: a missing owner is `Disconnected`, and a read that still
    /// fails after the configured retries is `Unavailable`.
    pub async fn read_vault_view(&self, owner: Option<&Pubkey>) -> VaultSnapshot {
        let Some(owner) = owner else {
            return VaultSnapshot::Disconnected;
        };

        let mut attempt = 0u32;
        loop {
            match self.try_read(owner).await {
                Ok(view) => return VaultSnapshot::Loaded(view),
                Err(err) if attempt < self.read_retries => {
                    let delay = self.retry_delay(attempt);
                    attempt += 1;
                    warn!(%owner, attempt, error = %err, ?delay, "vault read failed, retrying");
                    tokio::time::sleep(delay).await;
                },
                Err(err) => {
                    error!(%owner, error = %err, "error fetching vault");
                    return VaultSnapshot::Unavailable {
                        reason: err.to_string(),
                    };
                },
            }
        }
    }

    /// One read attempt, without retries
    pub async fn try_read(&self, owner: &Pubkey) -> Result<VaultView> {
        let vault = utils::derive_vault_pda(&self.program_id, owner)?;
        let state = utils::derive_state_pda(&self.program_id, owner)?;

        let vault_state =
            utils::fetch_vault_state(self.connection.as_ref(), &self.program_id, &state.address)
                .await
                .map_err(unavailable)?;

        let vault_account = utils::fetch_account(self.connection.as_ref(), &vault.address)
            .await
            .map_err(unavailable)?;
        let lamports = vault_account.as_ref().map(|a| a.lamports).unwrap_or(0);

        debug!(
            %owner,
            vault = %vault.address,
            lamports,
            initialized = vault_state.is_some(),
            "fetched vault"
        );

        Ok(VaultView {
            vault_address: vault.address,
            state_address: state.address,
            vault_account,
            vault_exists: vault_state.is_some(),
            vault_state,
            lamports,
            balance: utils::lamports_to_sol(lamports),
        })
    }

    /// The program account itself; `None` when the program is not deployed
    pub async fn program_account(&self) -> Result<Option<Account>> {
        utils::fetch_account(self.connection.as_ref(), &self.program_id).await
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

fn unavailable(err: VaultSdkError) -> VaultSdkError {
    match err {
        VaultSdkError::Connection(message) => VaultSdkError::ReadUnavailable(message),
        other => other,
    }
}
