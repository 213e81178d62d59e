//! A voter's mutable per-poll vote state.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::hash;
use crate::tree::MerkleAccumulator;

/// The vote option tree is quinary, matching the circuit.
pub const VOTE_TREE_ARITY: u8 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot
{
    /// Strictly increasing: plus one per accepted command, untouched by a
    /// rejected one.
    pub nonce: u64,

    /// Weight per vote option index.
    pub votes: Vec<u64>
}

impl Ballot
{
    /// A blank ballot, also the pad entry at index zero.
    pub fn pad(num_options: usize) -> Self
    {
        Ballot { nonce: 0, votes: vec![0; num_options] }
    }

    /// The root of the quinary tree of vote weights.
    pub fn votes_root(&self, vote_option_depth: u8) -> Result<Fr, TreeError>
    {
        let mut tree = MerkleAccumulator::new(VOTE_TREE_ARITY, vote_option_depth, hash::zero())?;
        for weight in &self.votes
        {
            tree.insert(Fr::from(*weight))?;
        }
        Ok(tree.root())
    }

    pub fn hash(&self, vote_option_depth: u8) -> Result<Fr, TreeError>
    {
        Ok(hash::hash2(Fr::from(self.nonce), self.votes_root(vote_option_depth)?)?)
    }
}
