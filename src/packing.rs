//! Bit-packing of bounded integers into field elements, and the salted
//! commitments chained across batches.
//!
//! Lane widths are a wire format shared byte-for-byte with the external
//! circuit and verifier; a mismatch produces a valid-looking but wrong proof
//! rather than an error, which is why overflow aborts loudly and round trips
//! are tested at the lane boundaries.

use ark_bn254::Fr;
use num_bigint::BigUint;

use crate::error::{HashError, PackError};
use crate::hash;

/// Every packed integer occupies one 50-bit lane.
pub const LANE_BITS: u32 = 50;

/// The largest value a lane can carry, `2^50 - 1`.
pub const LANE_MAX: u64 = (1 << LANE_BITS) - 1;

/// At most five lanes fit below the 254-bit field modulus.
pub const MAX_LANES: usize = 5;

/// Domain separation constants for deterministic batch salts.
pub const SALT_DOMAIN_PROCESS: u64 = 1;
pub const SALT_DOMAIN_TALLY_RESULTS: u64 = 2;
pub const SALT_DOMAIN_TALLY_TOTAL: u64 = 3;
pub const SALT_DOMAIN_TALLY_PER_OPTION: u64 = 4;

/// Pack an ordered list of named lanes into one field element. Lane zero
/// occupies the least significant bits.
pub fn pack(lanes: &[(&'static str, u64)]) -> Result<Fr, PackError>
{
    if lanes.len() > MAX_LANES
    {
        return Err(PackError::TooManyLanes { count: lanes.len() });
    }

    let shift = Fr::from(1u64 << LANE_BITS);
    let mut packed = hash::zero();
    let mut base = Fr::from(1u64);

    for &(lane, value) in lanes
    {
        if value > LANE_MAX
        {
            return Err(PackError::Overflow { lane, value });
        }
        packed += Fr::from(value) * base;
        base *= shift;
    }

    Ok(packed)
}

/// Reverse [`pack`] for a known lane count; bits beyond the expected lanes
/// are a hard error rather than silently dropped.
pub fn unpack(packed: Fr, count: usize) -> Result<Vec<u64>, PackError>
{
    if count > MAX_LANES
    {
        return Err(PackError::TooManyLanes { count });
    }

    let mask = (BigUint::from(1u64) << LANE_BITS) - 1u64;
    let mut remaining: BigUint = packed.into();
    let mut lanes = Vec::with_capacity(count);

    for _ in 0..count
    {
        let lane = &remaining & &mask;
        let digits = lane.to_u64_digits();
        lanes.push(digits.first().copied().unwrap_or(0));
        remaining >>= LANE_BITS;
    }

    if remaining != BigUint::from(0u64)
    {
        return Err(PackError::Residue { count });
    }

    Ok(lanes)
}

/// Derive the salt for a batch commitment. Deterministic so that replaying an
/// identical log yields byte-identical circuit inputs; the checkpoint format
/// accordingly never stores salts.
pub fn derive_salt(domain: u64, poll_id: u64, batch: u64) -> Result<Fr, HashError>
{
    hash::hash3(Fr::from(domain), Fr::from(poll_id), Fr::from(batch))
}

/// The salted commitment to a state root and ballot root pair. Each batch
/// proof attests old commitment + messages = new commitment; the chain must
/// thread unbroken across batches.
pub fn commit_state_ballot(state_root: Fr, ballot_root: Fr, salt: Fr) -> Result<Fr, HashError>
{
    hash::hash3(state_root, ballot_root, salt)
}

/// The tally commitment: three independently salted sub-commitments combined
/// with a fixed-arity hash, so results, total spent and per-option spent can
/// each be revealed and audited independently after tallying completes.
pub fn commit_tally(
    results_root: Fr,
    results_salt: Fr,
    total_spent: Fr,
    total_salt: Fr,
    per_option_root: Fr,
    per_option_salt: Fr
) -> Result<Fr, HashError>
{
    hash::hash3(
        hash::hash2(results_root, results_salt)?,
        hash::hash2(total_spent, total_salt)?,
        hash::hash2(per_option_root, per_option_salt)?
    )
}
