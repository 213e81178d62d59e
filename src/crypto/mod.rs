pub mod encryption;
pub mod keys;
pub mod signature;

pub use encryption::{decrypt, encrypt, SharedKey, MESSAGE_WORDS, PLAINTEXT_WORDS};
pub use keys::{shared_key, Keypair, PrivateKey, PublicKey};
pub use signature::{sign, verify, Signature};
