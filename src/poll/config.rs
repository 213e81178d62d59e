//! The statically validated poll configuration, fixed at deploy time.

use serde::{Deserialize, Serialize};

use crate::domain::ballot::VOTE_TREE_ARITY;
use crate::error::PollError;
use crate::packing::LANE_MAX;

/// Depths of the poll's accumulators. All must match the external circuit's
/// compile-time parameters exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDepths
{
    /// State and ballot trees (binary).
    pub state: u8,

    /// Message tree (quinary).
    pub message: u8,

    /// Vote option tree per ballot (quinary).
    pub vote_option: u8
}

/// Fixed batch widths; every process or tally call consumes exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSizes
{
    pub messages: u64,
    pub ballots: u64
}

/// The spending rule applied during validation and tallying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingMode
{
    /// Casting weight `w` consumes `w²` voice credits.
    Quadratic,

    /// Casting weight `w` consumes `w` voice credits.
    Linear
}

impl VotingMode
{
    /// The credit cost of casting the given weight.
    pub fn cost(&self, weight: u64) -> u128
    {
        match self
        {
            VotingMode::Quadratic => (weight as u128) * (weight as u128),
            VotingMode::Linear => weight as u128
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig
{
    /// The poll end time (unix seconds), echoed from the external source.
    pub end_time: u64,

    pub tree_depths: TreeDepths,

    pub batch_sizes: BatchSizes,

    /// The exclusive upper bound on vote option indices.
    pub vote_options: u64,

    pub mode: VotingMode,

    /// The maximal voice credit balance grantable at join time.
    pub max_voice_credits: u64
}

impl PollConfig
{
    pub fn validate(&self) -> Result<(), PollError>
    {
        let vote_capacity = (VOTE_TREE_ARITY as u64)
            .checked_pow(self.tree_depths.vote_option as u32)
            .unwrap_or(u64::MAX);

        let valid = self.tree_depths.state > 0
            && self.tree_depths.message > 0
            && self.batch_sizes.messages > 0
            && self.batch_sizes.ballots > 0
            && self.vote_options > 0
            && self.vote_options <= vote_capacity
            && self.vote_options <= LANE_MAX
            && self.max_voice_credits <= LANE_MAX;

        if valid { Ok(()) } else { Err(PollError::InvalidConfiguration) }
    }
}
