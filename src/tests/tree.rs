use ark_bn254::Fr;

use crate::error::TreeError;
use crate::hash;
use crate::tree::MerkleAccumulator;

/// The root of a partially filled binary tree matches the hand-computed
/// combination of leaves and zero-subtree constants.
#[test]
fn partial_root_matches_manual_computation()
{
    let mut tree = MerkleAccumulator::new(2, 2, hash::zero()).unwrap();
    tree.insert(Fr::from(1u64)).unwrap();
    tree.insert(Fr::from(2u64)).unwrap();
    tree.insert(Fr::from(3u64)).unwrap();

    let left = hash::hash2(Fr::from(1u64), Fr::from(2u64)).unwrap();
    let right = hash::hash2(Fr::from(3u64), hash::zero()).unwrap();
    let expected = hash::hash2(left, right).unwrap();

    assert_eq!(tree.root(), expected);
}

/// An empty tree reports the zero-subtree root of its full depth.
#[test]
fn empty_root_is_zero_subtree_constant()
{
    let tree = MerkleAccumulator::new(5, 3, hash::zero()).unwrap();
    let zeroes = hash::merkle_zeroes(5, 3, hash::zero()).unwrap();

    assert_eq!(tree.root(), zeroes[3]);
}

/// Proofs always carry `depth` sibling groups; with few leaves the upper
/// groups are zero-subtree padding and `real_depth` says how many are real.
#[test]
fn proof_verifies_with_padded_levels()
{
    let mut tree = MerkleAccumulator::new(2, 4, hash::zero()).unwrap();
    for i in 0..3u64
    {
        tree.insert(Fr::from(100 + i)).unwrap();
    }

    let proof = tree.proof(2).unwrap();
    assert_eq!(proof.siblings.len(), 4);
    assert_eq!(proof.real_depth, 2);
    assert!(proof.verify().unwrap());
}

#[test]
fn tampered_proof_fails_verification()
{
    let mut tree = MerkleAccumulator::new(2, 3, hash::zero()).unwrap();
    tree.insert(Fr::from(7u64)).unwrap();
    tree.insert(Fr::from(8u64)).unwrap();

    let mut proof = tree.proof(1).unwrap();
    proof.leaf = Fr::from(9u64);
    assert!(!proof.verify().unwrap());
}

#[test]
fn quinary_proof_verifies()
{
    let mut tree = MerkleAccumulator::new(5, 2, hash::zero()).unwrap();
    for i in 0..7u64
    {
        tree.insert(Fr::from(i)).unwrap();
    }

    let proof = tree.proof(6).unwrap();
    assert_eq!(proof.siblings[0].len(), 4);
    assert!(proof.verify().unwrap());
}

#[test]
fn insert_beyond_capacity_is_rejected()
{
    let mut tree = MerkleAccumulator::new(2, 2, hash::zero()).unwrap();
    for i in 0..4u64
    {
        tree.insert(Fr::from(i)).unwrap();
    }

    assert!(tree.is_full());
    assert_eq!(
        tree.insert(Fr::from(4u64)),
        Err(TreeError::CapacityExceeded { capacity: 4 })
    );
}

#[test]
fn leaves_are_retrievable_in_insertion_order()
{
    let mut tree = MerkleAccumulator::new(2, 3, hash::zero()).unwrap();
    tree.insert(Fr::from(7u64)).unwrap();
    tree.insert(Fr::from(8u64)).unwrap();

    assert_eq!(tree.leaf(0).unwrap(), Fr::from(7u64));
    assert_eq!(tree.leaf(1).unwrap(), Fr::from(8u64));
    assert_eq!(tree.leaves(), &[Fr::from(7u64), Fr::from(8u64)]);
    assert!(matches!(tree.leaf(2), Err(TreeError::IndexOutOfRange { index: 2 })));
}

#[test]
fn proof_of_missing_leaf_is_rejected()
{
    let mut tree = MerkleAccumulator::new(2, 3, hash::zero()).unwrap();
    tree.insert(Fr::from(1u64)).unwrap();

    assert!(matches!(
        tree.proof(1),
        Err(TreeError::IndexOutOfRange { index: 1 })
    ));
}

/// A tree restored from its checkpoint form reproduces the same root and
/// count; interior nodes are recomputed from the leaves alone.
#[test]
fn checkpoint_round_trip_preserves_root()
{
    let mut tree = MerkleAccumulator::new(5, 3, hash::zero()).unwrap();
    for i in 0..11u64
    {
        tree.insert(Fr::from(1_000 + i)).unwrap();
    }

    let value = serde_json::to_value(&tree).unwrap();
    let restored: MerkleAccumulator = serde_json::from_value(value).unwrap();

    assert_eq!(restored.root(), tree.root());
    assert_eq!(restored.count(), tree.count());
    assert_eq!(restored, tree);
}
