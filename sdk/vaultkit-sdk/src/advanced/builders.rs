use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;

use crate::core::connection::SolConnection;
use crate::error::{Result, VaultSdkError};

/// Assembles unsigned transactions paid for by the vault owner
pub struct TransactionBuilder {
    payer: Pubkey,
    instructions: Vec<Instruction>,
}

impl TransactionBuilder {
    pub fn new(payer: Pubkey) -> Self {
        Self {
            payer,
            instructions: Vec::new(),
        }
    }

    pub fn add_instruction(mut self, ix: Instruction) -> Self {
        self.instructions.push(ix);
        self
    }

    pub fn build_with_blockhash(self, blockhash: Hash) -> Transaction {
        let message =
            Message::new_with_blockhash(&self.instructions, Some(&self.payer), &blockhash);
        Transaction::new_unsigned(message)
    }

    /// Fetch a fresh blockhash and build. Failures here happen before any
    /// signature exists, so they surface as `SubmissionFailed`.
    pub async fn build_transaction(self, connection: &impl SolConnection) -> Result<Transaction> {
        let blockhash = connection.get_latest_blockhash().await.map_err(|e| {
            VaultSdkError::SubmissionFailed {
                message: format!("failed to fetch blockhash: {}", e),
                logs: Vec::new(),
            }
        })?;
        Ok(self.build_with_blockhash(blockhash))
    }
}
