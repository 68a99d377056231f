use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use tracing::warn;
use vaultkit_interface::{VaultState, STATE_SEED, VAULT_SEED};

use crate::core::connection::SolConnection;
use crate::core::constants::LAMPORTS_PER_SOL;
use crate::error::{Result, VaultSdkError};
use crate::types::{DerivedAddress, VaultStateRecord};

//=============================================================================
// PDA Derivation Helpers
//=============================================================================

/// Derive a program address from a seed tag and a raw owner identity.
///
/// Uses the ledger's canonical bump search, so the bump returned here is the
/// one the program re-derives on-chain.
pub fn derive_address(tag: &[u8], owner: &[u8], program_id: &Pubkey) -> Result<DerivedAddress> {
    if owner.len() != 32 {
        return Err(VaultSdkError::InvalidInput(format!(
            "owner identity must be 32 bytes, got {}",
            owner.len()
        )));
    }

    Pubkey::try_find_program_address(&[tag, owner], program_id)
        .map(|(address, bump)| DerivedAddress { address, bump })
        .ok_or_else(|| {
            VaultSdkError::InvalidInput("no viable bump seed for owner identity".to_string())
        })
}

/// Derive the Vault PDA (`["vault", owner]`)
pub fn derive_vault_pda(program_id: &Pubkey, owner: &Pubkey) -> Result<DerivedAddress> {
    derive_address(VAULT_SEED, owner.as_ref(), program_id)
}

/// Derive the Vault State PDA (`["state", owner]`)
pub fn derive_state_pda(program_id: &Pubkey, owner: &Pubkey) -> Result<DerivedAddress> {
    derive_address(STATE_SEED, owner.as_ref(), program_id)
}

/// Parse a base58 owner identity
pub fn parse_owner(owner: &str) -> Result<Pubkey> {
    Pubkey::from_str(owner.trim())
        .map_err(|e| VaultSdkError::InvalidInput(format!("invalid owner identity: {}", e)))
}

//=============================================================================
// Amount Conversion
//=============================================================================

/// Convert a SOL amount to lamports, rounding down.
///
/// Rejects non-finite, non-positive and sub-lamport amounts as well as
/// amounts that do not fit in a `u64`.
pub fn sol_to_lamports(amount: f64) -> Result<u64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(VaultSdkError::InvalidInput(format!(
            "amount must be greater than zero, got {}",
            amount
        )));
    }

    let lamports = (amount * LAMPORTS_PER_SOL as f64).floor();
    if lamports < 1.0 {
        return Err(VaultSdkError::InvalidInput(format!(
            "amount {} is smaller than one lamport",
            amount
        )));
    }
    if lamports >= u64::MAX as f64 {
        return Err(VaultSdkError::InvalidInput(format!(
            "amount {} is too large",
            amount
        )));
    }

    Ok(lamports as u64)
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

//=============================================================================
// Account Fetching & Parsing
//=============================================================================

/// Fetch an account, mapping transport failures to `Connection`
pub async fn fetch_account(
    connection: &impl SolConnection,
    address: &Pubkey,
) -> Result<Option<Account>> {
    connection
        .get_account(address)
        .await
        .map_err(|e| VaultSdkError::Connection(e.to_string()))
}

/// Decode a vault state account into its canonical record.
///
/// Accounts owned by another program or carrying a foreign layout are not
/// vault state records.
pub fn decode_state_record(program_id: &Pubkey, account: &Account) -> Result<VaultStateRecord> {
    if account.owner != *program_id {
        return Err(VaultSdkError::InvalidAccountData(format!(
            "state account owned by {}, expected {}",
            account.owner, program_id
        )));
    }

    VaultState::try_from_account_data(&account.data)
        .map(VaultStateRecord::from)
        .map_err(|e| VaultSdkError::InvalidAccountData(e.to_string()))
}

/// Fetch the vault state record at `state_address`.
///
/// A missing account is `Ok(None)`. An account that is present but does not
/// decode is also reported as absent, with a warning.
pub async fn fetch_vault_state(
    connection: &impl SolConnection,
    program_id: &Pubkey,
    state_address: &Pubkey,
) -> Result<Option<VaultStateRecord>> {
    let Some(account) = fetch_account(connection, state_address).await? else {
        return Ok(None);
    };

    match decode_state_record(program_id, &account) {
        Ok(record) => Ok(Some(record)),
        Err(err) => {
            warn!(%state_address, error = %err, "ignoring undecodable vault state account");
            Ok(None)
        },
    }
}
