//! The plaintext vote instruction and its published ciphertext form.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::checkpoint::{fr_from_dec, fr_to_dec};
use crate::crypto::{self, PublicKey, SharedKey, Signature, MESSAGE_WORDS, PLAINTEXT_WORDS};
use crate::error::{CryptoError, HashError};
use crate::hash;
use crate::packing;

/// A plaintext vote instruction, constructed and signed by a voter and
/// consumed once by the engine during batch processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command
{
    /// The voter's slot in the poll state tree.
    pub state_index: u64,

    /// The key authorized for this slot after the command is accepted.
    pub new_public_key: PublicKey,

    pub vote_option_index: u64,

    pub new_vote_weight: u64,

    /// Must equal the ballot's nonce plus one at processing time.
    pub nonce: u64,

    /// Binds the signature to one poll; prevents cross-poll replay.
    pub poll_id: u64,

    /// Blinds otherwise-identical commands.
    pub salt: Fr
}

impl Command
{
    /// The five bounded integers packed into one field element.
    pub fn pack(&self) -> Result<Fr, CryptoError>
    {
        Ok(packing::pack(&[
            ("state_index", self.state_index),
            ("vote_option_index", self.vote_option_index),
            ("new_vote_weight", self.new_vote_weight),
            ("nonce", self.nonce),
            ("poll_id", self.poll_id)
        ])?)
    }

    /// The canonical digest the signature covers.
    pub fn digest(&self) -> Result<Fr, CryptoError>
    {
        Ok(hash::hash4(
            self.pack()?,
            self.new_public_key.x(),
            self.new_public_key.y(),
            self.salt
        )?)
    }

    pub fn sign(&self, keypair: &crypto::Keypair) -> Result<Signature, CryptoError>
    {
        Ok(crypto::sign(keypair, self.digest()?)?)
    }

    pub fn verify(&self, public: &PublicKey, signature: &Signature) -> Result<bool, CryptoError>
    {
        Ok(crypto::verify(public, self.digest()?, signature)?)
    }

    /// Serialize the command plus signature and encrypt under the shared key.
    pub fn encrypt(&self, signature: &Signature, key: &SharedKey) -> Result<Message, CryptoError>
    {
        let [rx, ry, s] = signature.to_elements();
        let plaintext: [Fr; PLAINTEXT_WORDS] = [
            self.pack()?,
            self.new_public_key.x(),
            self.new_public_key.y(),
            self.salt,
            rx,
            ry,
            s
        ];
        Ok(Message { data: crypto::encrypt(&plaintext, key, hash::zero())? })
    }

    /// Re-derive the shared key's plaintext and deserialize. A malformed
    /// packed word or an off-curve new key surfaces as a decryption-tier
    /// failure, which callers convert into a no-op.
    pub fn decrypt(message: &Message, key: &SharedKey) -> Result<(Command, Signature), CryptoError>
    {
        let plaintext = crypto::decrypt(&message.data, key, hash::zero())?;

        let lanes =
            packing::unpack(plaintext[0], 5).map_err(|_| CryptoError::DecryptionFailure)?;
        let new_public_key = PublicKey::new(plaintext[1], plaintext[2])?;

        let command = Command {
            state_index: lanes[0],
            vote_option_index: lanes[1],
            new_vote_weight: lanes[2],
            nonce: lanes[3],
            poll_id: lanes[4],
            new_public_key,
            salt: plaintext[3]
        };
        let signature = Signature::from_elements(plaintext[4], plaintext[5], plaintext[6]);

        Ok((command, signature))
    }
}

/// The published ciphertext form of a command: a fixed ten-word body,
/// appended to the poll's message log together with the ephemeral public key
/// used to derive the shared key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MessageRepr", into = "MessageRepr")]
pub struct Message
{
    pub data: [Fr; MESSAGE_WORDS]
}

impl Message
{
    /// The inert all-zero message used to pad a partial batch to full width.
    /// Its authentication tag never verifies, so it always no-ops.
    pub fn pad() -> Self
    {
        Message { data: [hash::zero(); MESSAGE_WORDS] }
    }

    /// The accumulator leaf for this message: the two five-word halves hashed
    /// separately, then combined with the ephemeral key coordinates.
    pub fn leaf_hash(&self, ephemeral: &PublicKey) -> Result<Fr, HashError>
    {
        let left = hash::hash(&self.data[..5])?;
        let right = hash::hash(&self.data[5..])?;
        hash::hash4(left, right, ephemeral.x(), ephemeral.y())
    }
}

#[derive(Serialize, Deserialize)]
struct MessageRepr(Vec<String>);

impl From<Message> for MessageRepr
{
    fn from(message: Message) -> MessageRepr
    {
        MessageRepr(message.data.iter().map(fr_to_dec).collect())
    }
}

impl TryFrom<MessageRepr> for Message
{
    type Error = String;

    fn try_from(repr: MessageRepr) -> Result<Message, String>
    {
        if repr.0.len() != MESSAGE_WORDS
        {
            return Err(format!("message must have {MESSAGE_WORDS} words"));
        }

        let mut data = [hash::zero(); MESSAGE_WORDS];
        for (i, text) in repr.0.iter().enumerate()
        {
            data[i] = fr_from_dec(text).map_err(|e| e.to_string())?;
        }
        Ok(Message { data })
    }
}
