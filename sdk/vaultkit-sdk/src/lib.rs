pub mod advanced;
pub mod basic;
pub mod config;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

pub use crate::basic::actions::MutationOrchestrator;
pub use crate::basic::cache::{CacheLease, CachedSnapshot, VaultCache};
pub use crate::basic::reader::StateReader;
pub use crate::basic::wallet::VaultClient;
pub use crate::basic::watch::{VaultSession, VaultSubscription, VaultWatcher};
pub use crate::config::{Cluster, VaultConfig};
pub use crate::core::connection::SolConnection;
pub use crate::core::notify::{NotificationSink, TracingSink};
pub use crate::core::rpc::RpcConnection;
pub use crate::core::signer::{DetachedSigner, KeypairSigner, SignerError, WalletSigner};
pub use crate::error::{Result, VaultSdkError};
pub use crate::types::{
    DerivedAddress, OperationPhase, VaultKey, VaultOperation, VaultSnapshot, VaultStateRecord,
    VaultView,
};
pub use crate::utils::{
    derive_address, derive_state_pda, derive_vault_pda, lamports_to_sol, parse_owner,
    sol_to_lamports,
};

pub mod interface {
    pub use vaultkit_interface::{
        id, instruction::VaultInstruction, state::VaultState, ID, STATE_SEED, VAULT_SEED,
    };
}
