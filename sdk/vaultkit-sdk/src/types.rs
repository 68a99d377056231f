use serde::{Deserialize, Serialize};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::fmt;
use vaultkit_interface::VaultState;

use crate::config::Cluster;

/// A program-derived address and the canonical bump found for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub bump: u8,
}

/// Canonical vault state record.
///
/// Accepts both `vaultBump`/`stateBump` and `vault_bump`/`state_bump` when
/// deserialized, so every decoder converges on this one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultStateRecord {
    #[serde(alias = "vault_bump")]
    pub vault_bump: u8,

    #[serde(alias = "state_bump")]
    pub state_bump: u8,
}

impl From<VaultState> for VaultStateRecord {
    fn from(state: VaultState) -> Self {
        Self {
            vault_bump: state.vault_bump,
            state_bump: state.state_bump,
        }
    }
}

/// Cache key for a consolidated vault view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VaultKey {
    pub cluster: Cluster,
    pub owner: Pubkey,
}

impl VaultKey {
    pub fn new(cluster: Cluster, owner: Pubkey) -> Self {
        Self { cluster, owner }
    }
}

impl fmt::Display for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster, self.owner)
    }
}

/// Consolidated view of one owner's vault
#[derive(Debug, Clone, PartialEq)]
pub struct VaultView {
    /// Vault PDA holding deposited lamports
    pub vault_address: Pubkey,

    /// Vault state PDA, the existence marker
    pub state_address: Pubkey,

    /// Raw account at the vault PDA (absent until funded)
    pub vault_account: Option<Account>,

    /// Decoded state record (absent until initialized)
    pub vault_state: Option<VaultStateRecord>,

    /// Lamports held at the vault PDA
    pub lamports: u64,

    /// `lamports` in SOL
    pub balance: f64,

    /// True iff the state record is present
    pub vault_exists: bool,
}

/// Outcome of a vault read.
///
/// `Unavailable` means the state is unknown, which is different from a
/// `Loaded` view reporting `vault_exists == false`.
#[derive(Debug, Clone, PartialEq)]
pub enum VaultSnapshot {
    /// No owner identity (wallet not connected)
    Disconnected,
    /// Subscribed, but no fresh read has completed yet
    Loading,
    /// The read failed after retries
    Unavailable { reason: String },
    Loaded(VaultView),
}

impl VaultSnapshot {
    pub fn view(&self) -> Option<&VaultView> {
        match self {
            Self::Loaded(view) => Some(view),
            _ => None,
        }
    }

    pub fn into_view(self) -> Option<VaultView> {
        match self {
            Self::Loaded(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// The four state-changing vault operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultOperation {
    Initialize,
    Deposit,
    Withdraw,
    Close,
}

impl VaultOperation {
    pub const ALL: [VaultOperation; 4] = [
        VaultOperation::Initialize,
        VaultOperation::Deposit,
        VaultOperation::Withdraw,
        VaultOperation::Close,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Close => "close",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Initialize => "Vault initialized successfully!",
            Self::Deposit => "Deposit successful!",
            Self::Withdraw => "Withdrawal successful!",
            Self::Close => "Vault closed successfully!",
        }
    }

    pub fn failure_message(&self, reason: &str) -> String {
        let action = match self {
            Self::Initialize => "initialize vault",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Close => "close vault",
        };
        format!("Failed to {}: {}", action, reason)
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Initialize => 0,
            Self::Deposit => 1,
            Self::Withdraw => 2,
            Self::Close => 3,
        }
    }
}

impl fmt::Display for VaultOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle of a single mutation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationPhase {
    #[default]
    Idle,
    Submitting,
    AwaitingConfirmation(Signature),
    Succeeded(Signature),
    Failed(String),
}

impl OperationPhase {
    /// True while a request is between submission and confirmation
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting | Self::AwaitingConfirmation(_))
    }
}
