use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use vaultkit_interface::VaultInstruction;

use crate::error::{Result, VaultSdkError};
use crate::types::VaultOperation;
use crate::utils;

/// Accounts shared by every vault instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultAccounts {
    pub owner: Pubkey,
    pub vault_state: Pubkey,
    pub vault: Pubkey,
    pub system_program: Pubkey,
}

impl VaultAccounts {
    pub fn derive(program_id: &Pubkey, owner: &Pubkey) -> Result<Self> {
        let vault_state = utils::derive_state_pda(program_id, owner)?;
        let vault = utils::derive_vault_pda(program_id, owner)?;

        Ok(Self {
            owner: *owner,
            vault_state: vault_state.address,
            vault: vault.address,
            system_program: system_program::id(),
        })
    }

    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.owner, true),
            AccountMeta::new(self.vault_state, false),
            AccountMeta::new(self.vault, false),
            AccountMeta::new_readonly(self.system_program, false),
        ]
    }
}

fn build(
    program_id: &Pubkey,
    accounts: &VaultAccounts,
    ix: VaultInstruction,
) -> Result<Instruction> {
    let data = ix
        .pack()
        .map_err(|e| VaultSdkError::InvalidInput(e.to_string()))?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(),
        data,
    })
}

pub fn initialize(program_id: &Pubkey, accounts: &VaultAccounts) -> Result<Instruction> {
    build(program_id, accounts, VaultInstruction::Initialize)
}

pub fn deposit(
    program_id: &Pubkey,
    accounts: &VaultAccounts,
    lamports: u64,
) -> Result<Instruction> {
    build(
        program_id,
        accounts,
        VaultInstruction::Deposit { amount: lamports },
    )
}

pub fn withdraw(
    program_id: &Pubkey,
    accounts: &VaultAccounts,
    lamports: u64,
) -> Result<Instruction> {
    build(
        program_id,
        accounts,
        VaultInstruction::Withdraw { amount: lamports },
    )
}

pub fn close(program_id: &Pubkey, accounts: &VaultAccounts) -> Result<Instruction> {
    build(program_id, accounts, VaultInstruction::Close)
}

/// Instruction for `operation`. `lamports` is ignored by initialize and close.
pub fn for_operation(
    program_id: &Pubkey,
    accounts: &VaultAccounts,
    operation: VaultOperation,
    lamports: u64,
) -> Result<Instruction> {
    match operation {
        VaultOperation::Initialize => initialize(program_id, accounts),
        VaultOperation::Deposit => deposit(program_id, accounts, lamports),
        VaultOperation::Withdraw => withdraw(program_id, accounts, lamports),
        VaultOperation::Close => close(program_id, accounts),
    }
}
