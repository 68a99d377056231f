use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::error::Error;

/// Ledger RPC capability used by readers and mutations.
///
/// Implementations are expected to be eventually consistent and may fail
/// transiently; callers decide whether to retry.
#[async_trait]
pub trait SolConnection: Send + Sync {
    async fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<Signature, Box<dyn Error + Send + Sync>>;
    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn Error + Send + Sync>>;
    async fn get_latest_blockhash(&self) -> Result<Hash, Box<dyn Error + Send + Sync>>;

    /// Wait until `signature` reaches `commitment`. Errors if the transaction
    /// failed on-chain or could not be confirmed.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
