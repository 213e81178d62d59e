use ark_bn254::Fr;

use crate::error::PackError;
use crate::hash;
use crate::packing::{
    self, commit_tally, derive_salt, pack, unpack, LANE_BITS, LANE_MAX, SALT_DOMAIN_PROCESS,
    SALT_DOMAIN_TALLY_RESULTS
};

#[test]
fn pack_unpack_round_trip()
{
    let lanes = [("a", 0u64), ("b", 12_345), ("c", LANE_MAX), ("d", 1)];
    let packed = pack(&lanes).unwrap();
    let unpacked = unpack(packed, 4).unwrap();

    assert_eq!(unpacked, vec![0, 12_345, LANE_MAX, 1]);
}

/// Lane zero occupies the least significant bits.
#[test]
fn lane_order_is_little_endian()
{
    let packed = pack(&[("a", 1), ("b", 2)]).unwrap();
    let expected = Fr::from(1u64) + Fr::from(2u64) * Fr::from(1u64 << LANE_BITS);

    assert_eq!(packed, expected);
}

#[test]
fn boundary_value_packs_but_overflow_is_rejected()
{
    assert!(pack(&[("v", LANE_MAX)]).is_ok());
    assert_eq!(
        pack(&[("v", LANE_MAX + 1)]),
        Err(PackError::Overflow { lane: "v", value: LANE_MAX + 1 })
    );
}

#[test]
fn too_many_lanes_are_rejected()
{
    let lanes = [("a", 1), ("b", 1), ("c", 1), ("d", 1), ("e", 1), ("f", 1)];
    assert_eq!(pack(&lanes), Err(PackError::TooManyLanes { count: 6 }));
    assert_eq!(unpack(hash::zero(), 6), Err(PackError::TooManyLanes { count: 6 }));
}

/// Unpacking with a lane count smaller than the packed width leaves residual
/// bits, which is a hard error rather than silent truncation.
#[test]
fn unpack_rejects_residual_bits()
{
    let packed = pack(&[("a", 1), ("b", 2), ("c", 3)]).unwrap();
    assert_eq!(unpack(packed, 2), Err(PackError::Residue { count: 2 }));
}

/// Salts are deterministic in (domain, poll, batch) and distinct across each
/// coordinate.
#[test]
fn derived_salts_are_deterministic_and_separated()
{
    let salt = derive_salt(SALT_DOMAIN_PROCESS, 3, 7).unwrap();

    assert_eq!(salt, derive_salt(SALT_DOMAIN_PROCESS, 3, 7).unwrap());
    assert_ne!(salt, derive_salt(SALT_DOMAIN_TALLY_RESULTS, 3, 7).unwrap());
    assert_ne!(salt, derive_salt(SALT_DOMAIN_PROCESS, 4, 7).unwrap());
    assert_ne!(salt, derive_salt(SALT_DOMAIN_PROCESS, 3, 8).unwrap());
}

#[test]
fn state_ballot_commitment_matches_manual_hash()
{
    let commitment =
        packing::commit_state_ballot(Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)).unwrap();
    let expected = hash::hash3(Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)).unwrap();

    assert_eq!(commitment, expected);
}

/// The tally commitment combines three independently salted sub-commitments.
#[test]
fn tally_commitment_matches_manual_composition()
{
    let commitment = commit_tally(
        Fr::from(1u64),
        Fr::from(2u64),
        Fr::from(3u64),
        Fr::from(4u64),
        Fr::from(5u64),
        Fr::from(6u64)
    )
    .unwrap();

    let expected = hash::hash3(
        hash::hash2(Fr::from(1u64), Fr::from(2u64)).unwrap(),
        hash::hash2(Fr::from(3u64), Fr::from(4u64)).unwrap(),
        hash::hash2(Fr::from(5u64), Fr::from(6u64)).unwrap()
    )
    .unwrap();

    assert_eq!(commitment, expected);
}
