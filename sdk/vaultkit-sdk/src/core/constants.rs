use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::pubkey::Pubkey;

pub use solana_sdk::native_token::LAMPORTS_PER_SOL;

// Default Program ID for Devnet/Testnet
pub const DEFAULT_PROGRAM_ID: Pubkey = vaultkit_interface::ID;

/// Commitment a mutation must reach before it is reported as succeeded
pub const CONFIRMATION_LEVEL: CommitmentLevel = CommitmentLevel::Confirmed;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_READ_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1_500;
pub const DEFAULT_CONFIRM_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_CONFIRM_POLL_INTERVAL_MS: u64 = 500;
