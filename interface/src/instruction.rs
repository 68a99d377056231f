//! Instruction encoding
//!
//! Data layout: `[discriminator: 8][borsh args]`, where the discriminator is
//! the first 8 bytes of `sha256("global:<name>")`.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::InterfaceError;

pub const INITIALIZE_DISCRIMINATOR: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
pub const DEPOSIT_DISCRIMINATOR: [u8; 8] = [242, 35, 198, 137, 82, 225, 242, 182];
pub const WITHDRAW_DISCRIMINATOR: [u8; 8] = [183, 18, 70, 156, 148, 109, 161, 34];
pub const CLOSE_DISCRIMINATOR: [u8; 8] = [98, 165, 201, 177, 108, 65, 206, 96];

#[derive(BorshSerialize, BorshDeserialize)]
struct AmountArgs {
    amount: u64,
}

/// Vault program instructions.
///
/// Every instruction takes the same accounts:
/// 0. `[writable, signer]` User (owner)
/// 1. `[writable]` Vault state (PDA: ["state", user])
/// 2. `[writable]` Vault (PDA: ["vault", user])
/// 3. `[]` System program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultInstruction {
    /// Create the vault state record
    Initialize,
    /// Move `amount` lamports from the user into the vault
    Deposit { amount: u64 },
    /// Move `amount` lamports from the vault back to the user
    Withdraw { amount: u64 },
    /// Drain the vault to the user and destroy the state record
    Close,
}

impl VaultInstruction {
    pub fn discriminator(&self) -> [u8; 8] {
        match self {
            Self::Initialize => INITIALIZE_DISCRIMINATOR,
            Self::Deposit { .. } => DEPOSIT_DISCRIMINATOR,
            Self::Withdraw { .. } => WITHDRAW_DISCRIMINATOR,
            Self::Close => CLOSE_DISCRIMINATOR,
        }
    }

    pub fn pack(&self) -> Result<Vec<u8>, InterfaceError> {
        let mut data = self.discriminator().to_vec();
        match self {
            Self::Deposit { amount } | Self::Withdraw { amount } => {
                AmountArgs { amount: *amount }
                    .serialize(&mut data)
                    .map_err(|e| InterfaceError::Malformed(e.to_string()))?;
            },
            Self::Initialize | Self::Close => {},
        }
        Ok(data)
    }

    pub fn unpack(data: &[u8]) -> Result<Self, InterfaceError> {
        if data.len() < 8 {
            return Err(InterfaceError::DataTooShort {
                expected: 8,
                actual: data.len(),
            });
        }
        let (head, rest) = data.split_at(8);
        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(head);

        match discriminator {
            INITIALIZE_DISCRIMINATOR => Ok(Self::Initialize),
            CLOSE_DISCRIMINATOR => Ok(Self::Close),
            DEPOSIT_DISCRIMINATOR => Ok(Self::Deposit {
                amount: Self::unpack_amount(rest)?,
            }),
            WITHDRAW_DISCRIMINATOR => Ok(Self::Withdraw {
                amount: Self::unpack_amount(rest)?,
            }),
            other => Err(InterfaceError::UnknownDiscriminator(other)),
        }
    }

    fn unpack_amount(mut rest: &[u8]) -> Result<u64, InterfaceError> {
        AmountArgs::deserialize(&mut rest)
            .map(|args| args.amount)
            .map_err(|e| InterfaceError::Malformed(e.to_string()))
    }
}
