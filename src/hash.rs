//! Poseidon helpers with the circom parameterization.
//!
//! Every hash the engine computes must agree bit-for-bit with the external
//! circuit, so all widths go through the circom-tagged parameter set.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};
use light_poseidon::{Poseidon, PoseidonHasher};

use crate::error::HashError;

/// Hash an arbitrary-width input (1..=12 field elements).
pub fn hash(inputs: &[Fr]) -> Result<Fr, HashError>
{
    let width = inputs.len();
    let mut hasher = Poseidon::<Fr>::new_circom(width).map_err(|_| HashError { width })?;
    hasher.hash(inputs).map_err(|_| HashError { width })
}

pub fn hash2(a: Fr, b: Fr) -> Result<Fr, HashError>
{
    hash(&[a, b])
}

pub fn hash3(a: Fr, b: Fr, c: Fr) -> Result<Fr, HashError>
{
    hash(&[a, b, c])
}

pub fn hash4(a: Fr, b: Fr, c: Fr, d: Fr) -> Result<Fr, HashError>
{
    hash(&[a, b, c, d])
}

pub fn hash5(a: Fr, b: Fr, c: Fr, d: Fr, e: Fr) -> Result<Fr, HashError>
{
    hash(&[a, b, c, d, e])
}

/// Fold `items` into a running chain hash, starting from `init`.
///
/// Used to bind the messages of a batch into a single field element in the
/// exact order they were processed.
pub fn chain(init: Fr, items: impl IntoIterator<Item = Fr>) -> Result<Fr, HashError>
{
    let mut acc = init;
    for item in items
    {
        acc = hash2(acc, item)?;
    }
    Ok(acc)
}

/// The per-level roots of the all-zero subtree for the given arity.
///
/// `zeroes[0]` is the zero leaf itself; `zeroes[l + 1]` is the hash of
/// `arity` copies of `zeroes[l]`. The circuit relies on the same table to pad
/// levels beyond the populated depth.
pub fn merkle_zeroes(arity: u8, depth: u8, zero_leaf: Fr) -> Result<Vec<Fr>, HashError>
{
    let mut zeroes = Vec::with_capacity(depth as usize + 1);
    zeroes.push(zero_leaf);
    for level in 0..depth as usize
    {
        let children = vec![zeroes[level]; arity as usize];
        zeroes.push(hash(&children)?);
    }
    Ok(zeroes)
}

/// Reduce a BN254 field element into the Baby Jubjub scalar field.
///
/// Used to derive signing nonces and challenges from Poseidon digests.
pub fn to_scalar(element: Fr) -> ark_ed_on_bn254::Fr
{
    ark_ed_on_bn254::Fr::from_le_bytes_mod_order(&element.into_bigint().to_bytes_le())
}

/// Lift a Baby Jubjub scalar into the BN254 field. Lossless, since the
/// subgroup order is smaller than the BN254 modulus.
pub fn from_scalar(scalar: ark_ed_on_bn254::Fr) -> Fr
{
    Fr::from_le_bytes_mod_order(&scalar.into_bigint().to_bytes_le())
}

/// The additive identity, used for padding and chain-hash seeds.
pub fn zero() -> Fr
{
    Fr::zero()
}
