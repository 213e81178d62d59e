use ark_bn254::Fr;

use crate::checkpoint::Checkpoint;
use crate::error::{PollError, RegistryError};
use crate::hash;
use crate::registry::Registry;
use crate::tests::{coordinator, nullifier, participant, publish, test_config, vote_command};

/// Signup indices start at one; slot zero is the reserved pad leaf.
#[test]
fn signup_indices_start_at_one()
{
    let mut registry = Registry::new(10).unwrap();

    assert_eq!(registry.sign_up(participant(1).public, 100).unwrap(), 1);
    assert_eq!(registry.sign_up(participant(2).public, 101).unwrap(), 2);
    assert_eq!(registry.num_signups(), 2);

    assert!(registry.signup(0).is_none());
    assert_eq!(registry.signup(1).unwrap().public_key, participant(1).public);
    assert_eq!(registry.signup(2).unwrap().timestamp, 101);
}

#[test]
fn signup_proof_verifies_against_the_root()
{
    let mut registry = Registry::new(6).unwrap();
    registry.sign_up(participant(1).public, 100).unwrap();
    registry.sign_up(participant(2).public, 101).unwrap();

    let proof = registry.proof(1).unwrap();
    assert_eq!(proof.root, registry.root());
    assert!(proof.verify().unwrap());

    // Signup leaves carry a fixed unit balance lane; spendable balances are
    // granted per poll at join time.
    let key = participant(1).public;
    let expected =
        hash::hash4(key.x(), key.y(), Fr::from(1u64), Fr::from(100u64)).unwrap();
    assert_eq!(proof.leaf, expected);
}

/// The pad leaf consumes one slot of the signup capacity.
#[test]
fn signup_capacity_is_enforced()
{
    let mut registry = Registry::new(1).unwrap();
    registry.sign_up(participant(1).public, 100).unwrap();

    assert!(matches!(
        registry.sign_up(participant(2).public, 101),
        Err(RegistryError::CapacityExceeded)
    ));
}

/// Null polls consume an id without materializing state, keeping local ids
/// in lockstep with the external log.
#[test]
fn null_polls_keep_ids_in_lockstep()
{
    let mut registry = Registry::new(10).unwrap();

    assert_eq!(registry.deploy_null_poll(), 0);
    let id = registry.deploy_poll(test_config(), coordinator()).unwrap();
    assert_eq!(id, 1);
    assert_eq!(registry.num_polls(), 2);

    assert!(matches!(registry.poll(0), Err(RegistryError::PollNotFound { id: 0 })));
    assert_eq!(registry.poll(1).unwrap().id(), 1);
    assert!(matches!(registry.poll(2), Err(RegistryError::PollNotFound { id: 2 })));
}

#[test]
fn copy_and_equals_are_structural()
{
    let mut registry = Registry::new(10).unwrap();
    registry.sign_up(participant(1).public, 100).unwrap();
    registry.deploy_poll(test_config(), coordinator()).unwrap();

    let copy = registry.copy();
    assert!(copy.equals(&registry));

    registry.sign_up(participant(2).public, 101).unwrap();
    assert!(!copy.equals(&registry));
}

/// A registry restored from its checkpoint carries every poll minus the
/// coordinator secrets; once re-supplied, processing continues in lockstep
/// with the original.
#[test]
fn checkpoint_round_trip_resumes_processing()
{
    let mut registry = Registry::new(10).unwrap();
    registry.sign_up(participant(1).public, 100).unwrap();
    let id = registry.deploy_poll(test_config(), coordinator()).unwrap();

    let voter = participant(1);
    {
        let poll = registry.poll_mut(id).unwrap();
        poll.join_poll(nullifier(&voter), voter.public, 100).unwrap();
        let command = vote_command(id, 1, &voter, 0, 4, 1, 11);
        publish(poll, &voter, &command, 1);
        poll.update_poll(1).unwrap();
    }

    let snapshot = registry.serialize_state().unwrap();
    let mut restored = Registry::deserialize_state(snapshot).unwrap();
    assert!(restored.equals(&registry));

    assert!(matches!(
        restored.poll_mut(id).unwrap().process_messages(),
        Err(PollError::StateNotReady)
    ));

    let num_signups = restored.num_signups();
    let restored_poll = restored.poll_mut(id).unwrap();
    restored_poll.set_coordinator_keypair(coordinator()).unwrap();
    restored_poll.set_num_signups(num_signups);

    let original_poll = registry.poll_mut(id).unwrap();
    assert_eq!(
        restored_poll.process_messages().unwrap(),
        original_poll.process_messages().unwrap()
    );
    assert_eq!(restored_poll.tally_votes().unwrap(), original_poll.tally_votes().unwrap());
    assert!(restored.equals(&registry));
}
