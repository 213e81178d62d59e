mod packing;
mod registry;
mod tree;

use ark_bn254::Fr;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::crypto::{shared_key, Keypair};
use crate::domain::Command;
use crate::hash;
use crate::poll::{BatchSizes, Poll, PollConfig, TreeDepths, VotingMode};

/// The coordinator identity shared by the test scenarios.
pub fn coordinator() -> Keypair
{
    Keypair::random(&mut StdRng::seed_from_u64(42))
}

/// A deterministic participant identity.
pub fn participant(seed: u64) -> Keypair
{
    Keypair::random(&mut StdRng::seed_from_u64(1_000 + seed))
}

/// A deterministic ephemeral keypair for message encryption.
pub fn ephemeral(seed: u64) -> Keypair
{
    Keypair::random(&mut StdRng::seed_from_u64(5_000 + seed))
}

/// A join nullifier derived from the participant's private key.
pub fn nullifier(keypair: &Keypair) -> Fr
{
    hash::hash2(hash::from_scalar(keypair.private), Fr::from(1u64)).unwrap()
}

pub fn test_config() -> PollConfig
{
    PollConfig {
        end_time: 0,
        tree_depths: TreeDepths { state: 4, message: 2, vote_option: 1 },
        batch_sizes: BatchSizes { messages: 4, ballots: 2 },
        vote_options: 5,
        mode: VotingMode::Quadratic,
        max_voice_credits: 10_000
    }
}

/// A vote command that keeps the signer's key on file.
pub fn vote_command(
    poll_id: u64,
    state_index: u64,
    keypair: &Keypair,
    option: u64,
    weight: u64,
    nonce: u64,
    salt: u64
) -> Command
{
    Command {
        state_index,
        new_public_key: keypair.public,
        vote_option_index: option,
        new_vote_weight: weight,
        nonce,
        poll_id,
        salt: Fr::from(salt)
    }
}

/// Sign, encrypt and publish a command the way a voter client would.
pub fn publish(poll: &mut Poll, signer: &Keypair, command: &Command, seed: u64)
{
    let signature = command.sign(signer).unwrap();
    let eph = ephemeral(seed);
    let key = shared_key(&eph.private, poll.coordinator_public_key());
    let message = command.encrypt(&signature, &key).unwrap();
    poll.publish_message(message, eph.public).unwrap();
}
