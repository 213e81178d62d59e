use thiserror::Error;

/// The Poseidon permutation has no parameters for the requested width.
///
/// Widths used by the engine are fixed at compile time, so encountering this
/// at runtime indicates a configuration mismatch with the external circuit.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("poseidon hash failed for width {width}")]
pub struct HashError
{
    pub width: usize
}

/// Errors raised by the merkle accumulator.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TreeError
{
    /// The tree already holds `arity^depth` leaves.
    #[error("accumulator capacity of {capacity} leaves exceeded")]
    CapacityExceeded { capacity: u64 },

    /// The requested leaf has not been inserted.
    #[error("leaf index {index} out of range")]
    IndexOutOfRange { index: u64 },

    #[error(transparent)]
    Hash(#[from] HashError)
}

/// Errors raised by the key, signature and encryption primitives.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CryptoError
{
    /// The coordinates do not describe a point on the curve, or the point is
    /// outside the prime-order subgroup.
    #[error("public key is not a valid curve point")]
    InvalidPublicKey,

    /// The authentication tag did not match: corrupted ciphertext or a
    /// mismatched shared key.
    #[error("ciphertext failed to decrypt")]
    DecryptionFailure,

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Hash(#[from] HashError)
}

/// Errors raised when packing bounded integers into a field element.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PackError
{
    /// A value exceeds its reserved bit width. Silent truncation would
    /// desynchronize the replica from the external log, so this aborts.
    #[error("value {value} exceeds the {lane} lane width")]
    Overflow { lane: &'static str, value: u64 },

    /// More lanes were requested than fit in one field element.
    #[error("{count} lanes do not fit in a field element")]
    TooManyLanes { count: usize },

    /// The packed element carries bits beyond the expected lanes.
    #[error("packed value has residue beyond {count} lanes")]
    Residue { count: usize }
}

/// Errors raised by the per-poll engine.
///
/// Protocol-level rejections (bad nonce, bad signature, insufficient balance,
/// undecryptable ciphertext) never surface here; they are converted to no-ops
/// inside batch processing. These variants indicate a driver that is out of
/// sync with the poll's phase, or a capacity violation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PollError
{
    /// Publish or join attempted after the poll left the open phase.
    #[error("poll is no longer accepting messages or joins")]
    PollNotOpen,

    /// Processing attempted before `update_poll`, or without a coordinator
    /// private key.
    #[error("poll state is not ready for processing")]
    StateNotReady,

    /// Every message batch has already been processed.
    #[error("no unprocessed message batches remain")]
    NoMoreMessages,

    /// Tallying attempted before message processing finished.
    #[error("message processing is incomplete")]
    ProcessingIncomplete,

    /// Every ballot batch has already been tallied.
    #[error("all ballots have been tallied")]
    AllBallotsTallied,

    /// The join nullifier was seen before.
    #[error("nullifier has already been spent")]
    DuplicateNullifier,

    /// The requested voice credit balance exceeds the configured allotment.
    #[error("requested balance exceeds the poll allotment")]
    BalanceExceeded,

    /// The poll configuration is inconsistent.
    #[error("poll configuration is invalid")]
    InvalidConfiguration,

    /// The supplied keypair does not match the poll's coordinator key.
    #[error("keypair does not match the coordinator public key")]
    CoordinatorKeyMismatch,

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Hash(#[from] HashError)
}

/// Errors raised by the registry.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RegistryError
{
    /// The signup accumulator is full.
    #[error("signup capacity exceeded")]
    CapacityExceeded,

    /// No poll was deployed under the given id, or it was a null poll.
    #[error("poll {id} does not exist")]
    PollNotFound { id: u64 },

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Hash(#[from] HashError)
}
