//! Fixed-arity, fixed-depth, append-only merkle accumulator.
//!
//! The tree always reports the root of the *maximal* depth tree, with the
//! well-known zero-subtree constants standing in for unpopulated regions, the
//! way the circuits expect. Inclusion proofs carry the count of real
//! (non-padded) levels so a verifier knows how many siblings are genuine when
//! the configured depth exceeds the populated depth.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::checkpoint::{fr_from_dec, fr_to_dec};
use crate::error::{HashError, TreeError};
use crate::hash;

/// An inclusion proof for one leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof
{
    /// The proven leaf.
    pub leaf: Fr,

    /// Exactly `depth` sibling groups of `arity - 1` elements each, padded
    /// with zero-subtree constants beyond the populated depth.
    pub siblings: Vec<Vec<Fr>>,

    /// The leaf's position among its siblings at each level.
    pub path_indices: Vec<u8>,

    /// How many of the sibling groups are real rather than padding.
    pub real_depth: u8,

    /// The arity the proof was produced under.
    pub arity: u8,

    /// The full-depth root the proof resolves to.
    pub root: Fr
}

impl MerkleProof
{
    /// Recompute the root from the leaf and siblings and compare.
    pub fn verify(&self) -> Result<bool, HashError>
    {
        let arity = self.arity as usize;
        let mut acc = self.leaf;

        for (level, siblings) in self.siblings.iter().enumerate()
        {
            let position = self.path_indices[level] as usize;
            let mut children = Vec::with_capacity(arity);
            children.extend_from_slice(&siblings[..position]);
            children.push(acc);
            children.extend_from_slice(&siblings[position..]);
            acc = hash::hash(&children)?;
        }

        Ok(acc == self.root)
    }
}

/// Append-only merkle tree with O(depth) incremental inserts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TreeCheckpoint", into = "TreeCheckpoint")]
pub struct MerkleAccumulator
{
    arity: u8,
    depth: u8,
    zero_leaf: Fr,

    /// Zero-subtree roots per level; `zeroes[0]` is the zero leaf.
    zeroes: Vec<Fr>,

    /// Populated nodes per level; `levels[0]` holds the leaves and
    /// `levels[depth]` the root once any leaf exists.
    levels: Vec<Vec<Fr>>,

    count: u64
}

impl MerkleAccumulator
{
    pub fn new(arity: u8, depth: u8, zero_leaf: Fr) -> Result<Self, HashError>
    {
        let zeroes = hash::merkle_zeroes(arity, depth, zero_leaf)?;
        Ok(MerkleAccumulator {
            arity,
            depth,
            zero_leaf,
            zeroes,
            levels: vec![Vec::new(); depth as usize + 1],
            count: 0
        })
    }

    pub fn arity(&self) -> u8
    {
        self.arity
    }

    pub fn depth(&self) -> u8
    {
        self.depth
    }

    /// The number of inserted leaves.
    pub fn count(&self) -> u64
    {
        self.count
    }

    /// The maximal number of leaves, `arity^depth`.
    pub fn capacity(&self) -> u64
    {
        (self.arity as u64)
            .checked_pow(self.depth as u32)
            .unwrap_or(u64::MAX)
    }

    pub fn is_full(&self) -> bool
    {
        self.count >= self.capacity()
    }

    fn node(&self, level: usize, index: usize) -> Fr
    {
        self.levels[level]
            .get(index)
            .copied()
            .unwrap_or(self.zeroes[level])
    }

    /// Append a leaf and update its ancestor path.
    pub fn insert(&mut self, leaf: Fr) -> Result<u64, TreeError>
    {
        if self.is_full()
        {
            return Err(TreeError::CapacityExceeded { capacity: self.capacity() });
        }

        let arity = self.arity as usize;
        let mut index = self.count as usize;
        self.levels[0].push(leaf);

        for level in 0..self.depth as usize
        {
            let parent = index / arity;
            let base = parent * arity;

            let children: Vec<Fr> = (0..arity).map(|j| self.node(level, base + j)).collect();
            let parent_hash = hash::hash(&children)?;

            let upper = &mut self.levels[level + 1];
            if parent == upper.len()
            {
                upper.push(parent_hash);
            }
            else
            {
                upper[parent] = parent_hash;
            }

            index = parent;
        }

        self.count += 1;
        Ok(self.count - 1)
    }

    /// The root of the full-depth tree, zeroes beyond the populated edge.
    pub fn root(&self) -> Fr
    {
        if self.count == 0
        {
            self.zeroes[self.depth as usize]
        }
        else
        {
            self.levels[self.depth as usize][0]
        }
    }

    pub fn leaf(&self, index: u64) -> Result<Fr, TreeError>
    {
        if index >= self.count
        {
            return Err(TreeError::IndexOutOfRange { index });
        }
        Ok(self.levels[0][index as usize])
    }

    pub fn leaves(&self) -> &[Fr]
    {
        &self.levels[0]
    }

    /// The number of levels needed to hold the current leaf count; every
    /// level beyond it carries only zero-subtree siblings.
    pub fn populated_depth(&self) -> u8
    {
        let mut depth = 0u8;
        let mut cap = 1u64;
        while cap < self.count
        {
            cap = cap.saturating_mul(self.arity as u64);
            depth += 1;
        }
        depth
    }

    /// Produce an inclusion proof with exactly `depth` sibling groups.
    pub fn proof(&self, index: u64) -> Result<MerkleProof, TreeError>
    {
        if index >= self.count
        {
            return Err(TreeError::IndexOutOfRange { index });
        }

        let arity = self.arity as usize;
        let mut position = index as usize;
        let mut siblings = Vec::with_capacity(self.depth as usize);
        let mut path_indices = Vec::with_capacity(self.depth as usize);

        for level in 0..self.depth as usize
        {
            let base = (position / arity) * arity;
            let group: Vec<Fr> = (0..arity)
                .filter(|j| base + j != position)
                .map(|j| self.node(level, base + j))
                .collect();

            path_indices.push((position % arity) as u8);
            siblings.push(group);
            position /= arity;
        }

        Ok(MerkleProof {
            leaf: self.levels[0][index as usize],
            siblings,
            path_indices,
            real_depth: self.populated_depth(),
            arity: self.arity,
            root: self.root()
        })
    }
}

/// The canonical checkpoint form: configuration plus leaves, decimal encoded.
/// Interior nodes are recomputed on load.
#[derive(Serialize, Deserialize)]
struct TreeCheckpoint
{
    arity: u8,
    depth: u8,
    zero_leaf: String,
    leaves: Vec<String>
}

impl From<MerkleAccumulator> for TreeCheckpoint
{
    fn from(tree: MerkleAccumulator) -> TreeCheckpoint
    {
        TreeCheckpoint {
            arity: tree.arity,
            depth: tree.depth,
            zero_leaf: fr_to_dec(&tree.zero_leaf),
            leaves: tree.levels[0].iter().map(fr_to_dec).collect()
        }
    }
}

impl TryFrom<TreeCheckpoint> for MerkleAccumulator
{
    type Error = String;

    fn try_from(checkpoint: TreeCheckpoint) -> Result<MerkleAccumulator, String>
    {
        let zero_leaf = fr_from_dec(&checkpoint.zero_leaf).map_err(|e| e.to_string())?;
        let mut tree = MerkleAccumulator::new(checkpoint.arity, checkpoint.depth, zero_leaf)
            .map_err(|e| e.to_string())?;

        for text in &checkpoint.leaves
        {
            let leaf = fr_from_dec(text).map_err(|e| e.to_string())?;
            tree.insert(leaf).map_err(|e| e.to_string())?;
        }

        Ok(tree)
    }
}
