//! Off-chain state replica and batch tally engine for collusion resistant
//! zero-knowledge polls.
//!
//! Participants submit encrypted, signed voting instructions against a public
//! registry; a designated coordinator privately decrypts, validates and
//! tallies them in fixed-size batches, producing the exact field-element
//! vectors an external proving circuit and on-chain verifier require. The
//! engine is single-threaded and fully deterministic: replaying the same
//! message log against the same starting snapshot always yields byte
//! identical outputs.

pub mod checkpoint;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod hash;
pub mod packing;
pub mod poll;
pub mod registry;
pub mod tree;

#[cfg(test)]
mod tests;

pub use crypto::{Keypair, PrivateKey, PublicKey, Signature};
pub use domain::{Ballot, Command, Message, StateLeaf};
pub use error::{CryptoError, HashError, PackError, PollError, RegistryError, TreeError};
pub use poll::{BatchSizes, Poll, PollConfig, PollPhase, ProcessInputs, TallyInputs, TreeDepths, VotingMode};
pub use registry::Registry;
pub use tree::{MerkleAccumulator, MerkleProof};
