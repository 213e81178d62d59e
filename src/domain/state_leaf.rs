//! A joined identity's record in the poll state tree.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;
use crate::error::HashError;
use crate::hash;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLeaf
{
    /// The key currently authorized to sign commands for this slot.
    pub public_key: PublicKey,

    /// Credits still spendable. Debited when a command is accepted.
    pub voice_credit_balance: u64,

    pub timestamp: u64
}

impl StateLeaf
{
    pub fn new(public_key: PublicKey, voice_credit_balance: u64, timestamp: u64) -> Self
    {
        StateLeaf { public_key, voice_credit_balance, timestamp }
    }

    /// The reserved blank leaf at index zero. Carries no balance, so no
    /// command against it can ever validate a spend.
    pub fn pad() -> Self
    {
        StateLeaf {
            public_key: PublicKey::pad(),
            voice_credit_balance: 0,
            timestamp: 0
        }
    }

    pub fn hash(&self) -> Result<Fr, HashError>
    {
        hash::hash4(
            self.public_key.x(),
            self.public_key.y(),
            Fr::from(self.voice_credit_balance),
            Fr::from(self.timestamp)
        )
    }
}
