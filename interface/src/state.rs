use borsh::{BorshDeserialize, BorshSerialize};

use crate::InterfaceError;

/// First 8 bytes of `sha256("account:VaultState")`
pub const VAULT_STATE_DISCRIMINATOR: [u8; 8] = [228, 196, 82, 165, 98, 210, 235, 152];

/// On-chain vault state record.
///
/// Layout: `[discriminator: 8][vault_bump: 1][state_bump: 1]`
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultState {
    pub vault_bump: u8,
    pub state_bump: u8,
}

impl VaultState {
    pub const LEN: usize = 8 + 1 + 1;

    /// Decode account data, checking the discriminator. Trailing bytes are ignored.
    pub fn try_from_account_data(data: &[u8]) -> Result<Self, InterfaceError> {
        if data.len() < Self::LEN {
            return Err(InterfaceError::DataTooShort {
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(&data[..8]);
        if discriminator != VAULT_STATE_DISCRIMINATOR {
            return Err(InterfaceError::UnknownDiscriminator(discriminator));
        }

        let mut body = &data[8..Self::LEN];
        Self::deserialize(&mut body).map_err(|e| InterfaceError::Malformed(e.to_string()))
    }

    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&VAULT_STATE_DISCRIMINATOR);
        data.push(self.vault_bump);
        data.push(self.state_bump);
        data
    }
}
