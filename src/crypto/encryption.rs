//! Authenticated symmetric encryption over field elements.
//!
//! A Poseidon keystream in counter mode encrypts the fixed-width plaintext; a
//! chained Poseidon tag over the ciphertext authenticates it, so a corrupted
//! message or a mismatched shared key is detected at decryption rather than
//! producing a garbage command.

use ark_bn254::Fr;

use crate::error::{CryptoError, HashError};
use crate::hash;

/// The fixed plaintext width: packed command word, new key coordinates, salt
/// and the three signature elements.
pub const PLAINTEXT_WORDS: usize = 7;

/// The fixed published message width: ciphertext, tag, zero padding.
pub const MESSAGE_WORDS: usize = 10;

/// A Diffie-Hellman shared key, as curve point coordinates.
pub type SharedKey = (Fr, Fr);

fn keystream_word(key: &SharedKey, nonce: Fr, counter: u64) -> Result<Fr, HashError>
{
    hash::hash4(key.0, key.1, nonce, Fr::from(counter))
}

fn tag(key: &SharedKey, nonce: Fr, ciphertext: &[Fr]) -> Result<Fr, HashError>
{
    let init = hash::hash3(key.0, key.1, nonce)?;
    hash::chain(init, ciphertext.iter().copied())
}

/// Encrypt a fixed-width plaintext into a fixed-width message body.
pub fn encrypt(
    plaintext: &[Fr; PLAINTEXT_WORDS],
    key: &SharedKey,
    nonce: Fr
) -> Result<[Fr; MESSAGE_WORDS], HashError>
{
    let mut data = [hash::zero(); MESSAGE_WORDS];

    for (i, word) in plaintext.iter().enumerate()
    {
        data[i] = *word + keystream_word(key, nonce, i as u64)?;
    }
    data[PLAINTEXT_WORDS] = tag(key, nonce, &data[..PLAINTEXT_WORDS])?;

    Ok(data)
}

/// Reverse [`encrypt`], failing on a tag mismatch.
pub fn decrypt(
    data: &[Fr; MESSAGE_WORDS],
    key: &SharedKey,
    nonce: Fr
) -> Result<[Fr; PLAINTEXT_WORDS], CryptoError>
{
    let expected = tag(key, nonce, &data[..PLAINTEXT_WORDS])?;
    if expected != data[PLAINTEXT_WORDS]
    {
        return Err(CryptoError::DecryptionFailure);
    }

    let mut plaintext = [hash::zero(); PLAINTEXT_WORDS];
    for i in 0..PLAINTEXT_WORDS
    {
        plaintext[i] = data[i] - keystream_word(key, nonce, i as u64)?;
    }

    Ok(plaintext)
}
