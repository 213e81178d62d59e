//! The global registry: signed-up identities and the lifecycle of all polls.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::checkpoint::Checkpoint;
use crate::crypto::{Keypair, PublicKey};
use crate::domain::StateLeaf;
use crate::error::RegistryError;
use crate::hash;
use crate::poll::{Poll, PollConfig, STATE_TREE_ARITY};
use crate::tree::{MerkleAccumulator, MerkleProof};

/// Balance lane of the signup leaf. Spendable balances are granted per poll
/// at join time, so the global leaf carries this fixed marker instead.
const SIGNUP_BALANCE: u64 = 1;

/// One signed-up identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signup
{
    pub public_key: PublicKey,
    pub timestamp: u64
}

/// Process-wide replica of the on-chain registry. Polls are added
/// monotonically and never removed, so poll ids stay in lockstep with the
/// external event log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registry
{
    /// Signed-up identities, in signup order; index 0 is the reserved pad.
    signups: Vec<Signup>,

    accumulator: MerkleAccumulator,

    /// `None` entries are null polls: ids consumed during replay for polls
    /// irrelevant to the current task.
    polls: Vec<Option<Poll>>
}

impl Registry
{
    pub fn new(signup_depth: u8) -> Result<Self, RegistryError>
    {
        let mut accumulator =
            MerkleAccumulator::new(STATE_TREE_ARITY, signup_depth, hash::zero())?;
        accumulator.insert(StateLeaf::pad().hash()?)?;

        Ok(Registry { signups: Vec::new(), accumulator, polls: Vec::new() })
    }

    /// Register an identity. Real indices start at 1; index 0 is the pad.
    ///
    /// Key validity is enforced by construction of [`PublicKey`], so the only
    /// failure left here is capacity.
    pub fn sign_up(&mut self, public_key: PublicKey, timestamp: u64) -> Result<u64, RegistryError>
    {
        if self.accumulator.is_full()
        {
            return Err(RegistryError::CapacityExceeded);
        }

        let leaf = hash::hash4(
            public_key.x(),
            public_key.y(),
            Fr::from(SIGNUP_BALANCE),
            Fr::from(timestamp)
        )?;
        let index = self.accumulator.insert(leaf)?;
        self.signups.push(Signup { public_key, timestamp });

        tracing::trace!(index, "identity signed up");
        Ok(index)
    }

    /// The number of real signups, excluding the pad entry.
    pub fn num_signups(&self) -> u64
    {
        self.accumulator.count() - 1
    }

    pub fn root(&self) -> Fr
    {
        self.accumulator.root()
    }

    pub fn proof(&self, index: u64) -> Result<MerkleProof, RegistryError>
    {
        Ok(self.accumulator.proof(index)?)
    }

    pub fn signup(&self, index: u64) -> Option<&Signup>
    {
        // Pad entry occupies accumulator slot 0 but is not a signup.
        index.checked_sub(1).and_then(|i| self.signups.get(i as usize))
    }

    /// Deploy a poll under the next sequential id.
    pub fn deploy_poll(
        &mut self,
        config: PollConfig,
        coordinator: Keypair
    ) -> Result<u64, RegistryError>
    {
        let id = self.polls.len() as u64;
        let poll = Poll::new(id, config, coordinator)?;
        self.polls.push(Some(poll));

        tracing::debug!(id, "poll deployed");
        Ok(id)
    }

    /// Advance the id counter without materializing poll state, so that id
    /// numbering stays in lockstep with the external log during replay.
    pub fn deploy_null_poll(&mut self) -> u64
    {
        let id = self.polls.len() as u64;
        self.polls.push(None);

        tracing::debug!(id, "null poll deployed");
        id
    }

    pub fn num_polls(&self) -> u64
    {
        self.polls.len() as u64
    }

    pub fn poll(&self, id: u64) -> Result<&Poll, RegistryError>
    {
        self.polls
            .get(id as usize)
            .and_then(|p| p.as_ref())
            .ok_or(RegistryError::PollNotFound { id })
    }

    pub fn poll_mut(&mut self, id: u64) -> Result<&mut Poll, RegistryError>
    {
        self.polls
            .get_mut(id as usize)
            .and_then(|p| p.as_mut())
            .ok_or(RegistryError::PollNotFound { id })
    }

    /// Full structural clone.
    pub fn copy(&self) -> Self
    {
        self.clone()
    }

    /// Equality over the canonical serialized form.
    pub fn equals(&self, other: &Self) -> bool
    {
        self.structural_eq(other)
    }
}

impl Checkpoint for Registry {}
