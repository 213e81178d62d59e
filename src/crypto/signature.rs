//! Schnorr signatures over Baby Jubjub with Poseidon challenges, the scheme
//! the processing circuit verifies. The nonce is derived deterministically
//! from the private key and the digest, so signing is replayable.

use ark_bn254::Fr;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::{EdwardsAffine, EdwardsProjective};

use crate::crypto::keys::{Keypair, PrivateKey, PublicKey};
use crate::error::HashError;
use crate::hash;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature
{
    /// The commitment point `R = k · G`.
    pub r: EdwardsAffine,

    /// The response scalar `s = k + e · sk`.
    pub s: PrivateKey
}

impl Signature
{
    /// The three field elements the wire format carries.
    pub fn to_elements(&self) -> [Fr; 3]
    {
        [self.r.x, self.r.y, hash::from_scalar(self.s)]
    }

    /// Rebuild a signature from wire elements. The point is deliberately not
    /// subgroup-checked here: a corrupted point simply fails verification.
    pub fn from_elements(rx: Fr, ry: Fr, s: Fr) -> Self
    {
        Signature {
            r: EdwardsAffine::new_unchecked(rx, ry),
            s: hash::to_scalar(s)
        }
    }
}

/// Sign a digest with a deterministic nonce.
pub fn sign(keypair: &Keypair, digest: Fr) -> Result<Signature, HashError>
{
    let sk = hash::from_scalar(keypair.private);
    let k = hash::to_scalar(hash::hash2(sk, digest)?);

    let r: EdwardsAffine = (EdwardsAffine::generator() * k).into_affine();
    let e = challenge(&r, &keypair.public, digest)?;
    let s = k + e * keypair.private;

    Ok(Signature { r, s })
}

/// Verify `s · G == R + e · A`.
pub fn verify(public: &PublicKey, digest: Fr, signature: &Signature) -> Result<bool, HashError>
{
    if !signature.r.is_on_curve()
    {
        return Ok(false);
    }

    let e = challenge(&signature.r, public, digest)?;
    let lhs: EdwardsProjective = EdwardsAffine::generator() * signature.s;
    let rhs: EdwardsProjective = EdwardsProjective::from(signature.r) + public.point() * e;

    Ok(lhs == rhs)
}

fn challenge(r: &EdwardsAffine, public: &PublicKey, digest: Fr) -> Result<PrivateKey, HashError>
{
    let e = hash::hash5(r.x, r.y, public.x(), public.y(), digest)?;
    Ok(hash::to_scalar(e))
}
