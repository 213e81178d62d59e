//! Key pairs on Baby Jubjub, the embedded curve whose base field is the
//! BN254 scalar field, so public key coordinates are field elements the
//! circuits consume directly.

use ark_bn254::Fr;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::EdwardsAffine;
use ark_ff::One;
use ark_std::UniformRand;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::checkpoint::{fr_from_dec, fr_to_dec};
use crate::error::{CryptoError, HashError};
use crate::hash;

/// A private scalar on the embedded curve.
pub type PrivateKey = ark_ed_on_bn254::Fr;

/// A validated public curve point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyRepr", into = "PublicKeyRepr")]
pub struct PublicKey
{
    point: EdwardsAffine
}

impl PublicKey
{
    /// Build a public key from affine coordinates, rejecting points off the
    /// curve or outside the prime-order subgroup.
    pub fn new(x: Fr, y: Fr) -> Result<Self, CryptoError>
    {
        let point = EdwardsAffine::new_unchecked(x, y);
        if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve()
        {
            return Err(CryptoError::InvalidPublicKey);
        }
        Ok(PublicKey { point })
    }

    pub(crate) fn from_point(point: EdwardsAffine) -> Self
    {
        PublicKey { point }
    }

    pub fn x(&self) -> Fr
    {
        self.point.x
    }

    pub fn y(&self) -> Fr
    {
        self.point.y
    }

    pub(crate) fn point(&self) -> EdwardsAffine
    {
        self.point
    }

    /// The Poseidon digest of the coordinates, used as the circuit-facing
    /// identity of the key.
    pub fn digest(&self) -> Result<Fr, HashError>
    {
        hash::hash2(self.point.x, self.point.y)
    }

    /// The well-known key occupying pad slots. Its discrete log (one) is
    /// public, which is harmless: pad entries carry no balance and their
    /// ballots never validate.
    pub fn pad() -> Self
    {
        let point = (EdwardsAffine::generator() * PrivateKey::one()).into_affine();
        PublicKey { point }
    }
}

/// A signing/encryption identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keypair
{
    pub private: PrivateKey,
    pub public: PublicKey
}

impl Keypair
{
    pub fn from_private(private: PrivateKey) -> Self
    {
        let point = (EdwardsAffine::generator() * private).into_affine();
        Keypair { private, public: PublicKey { point } }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self
    {
        Self::from_private(PrivateKey::rand(rng))
    }
}

/// Diffie-Hellman shared key derivation: the coordinates of `private · P`.
pub fn shared_key(private: &PrivateKey, public: &PublicKey) -> (Fr, Fr)
{
    let shared: EdwardsAffine = (public.point() * *private).into_affine();
    (shared.x, shared.y)
}

#[derive(Serialize, Deserialize)]
struct PublicKeyRepr
{
    x: String,
    y: String
}

impl From<PublicKey> for PublicKeyRepr
{
    fn from(key: PublicKey) -> PublicKeyRepr
    {
        PublicKeyRepr {
            x: fr_to_dec(&key.x()),
            y: fr_to_dec(&key.y())
        }
    }
}

impl TryFrom<PublicKeyRepr> for PublicKey
{
    type Error = String;

    fn try_from(repr: PublicKeyRepr) -> Result<PublicKey, String>
    {
        let x = fr_from_dec(&repr.x).map_err(|e| e.to_string())?;
        let y = fr_from_dec(&repr.y).map_err(|e| e.to_string())?;
        PublicKey::new(x, y).map_err(|e| e.to_string())
    }
}
