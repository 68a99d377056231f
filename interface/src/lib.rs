//! VaultKit Program Interface
//!
//! Client-side view of the on-chain vault program: seeds, the program id,
//! instruction encoding and the `VaultState` account layout.

pub mod instruction;
pub mod state;

use solana_program::pubkey;
use solana_program::pubkey::Pubkey;
use thiserror::Error;

pub use instruction::VaultInstruction;
pub use state::VaultState;

/// Default program id (devnet/testnet deployment)
pub const ID: Pubkey = pubkey!("VauLtKit11111111111111111111111111111111111");

/// Seed tag for the vault PDA holding deposited lamports
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed tag for the vault state PDA
pub const STATE_SEED: &[u8] = b"state";

pub fn id() -> Pubkey {
    ID
}

/// Errors raised while decoding program data
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("Data too short: expected at least {expected} bytes, got {actual}")]
    DataTooShort { expected: usize, actual: usize },

    #[error("Unknown discriminator: {0:?}")]
    UnknownDiscriminator([u8; 8]),

    #[error("Malformed payload: {0}")]
    Malformed(String),
}
