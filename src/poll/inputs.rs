//! The per-batch field-element vectors handed to the external proving layer.
//!
//! Every field here is consumed by the corresponding circuit; a field present
//! but unconsumed (or vice versa) is an integration failure caught by the
//! cross-layer test vectors, not at runtime.

use ark_bn254::Fr;

/// Public inputs for one message-processing batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessInputs
{
    /// Vote option bound, signup count and batch start/end, bit-packed.
    pub packed_values: Fr,

    /// Poseidon digest of the coordinator public key coordinates.
    pub coordinator_public_key_hash: Fr,

    /// Chain hash binding the messages actually processed, in processing
    /// order.
    pub batch_hash: Fr,

    /// The salted state+ballot commitment before this batch.
    pub old_state_ballot_commitment: Fr,

    /// The salted state+ballot commitment after this batch; the next batch
    /// must start from it.
    pub new_state_ballot_commitment: Fr,

    /// Single public-input digest binding all of the above.
    pub input_hash: Fr
}

impl ProcessInputs
{
    pub fn to_vec(&self) -> Vec<Fr>
    {
        vec![
            self.packed_values,
            self.coordinator_public_key_hash,
            self.batch_hash,
            self.old_state_ballot_commitment,
            self.new_state_ballot_commitment,
            self.input_hash,
        ]
    }
}

/// Public inputs for one ballot-tally batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TallyInputs
{
    /// Batch start index and signup count, bit-packed.
    pub packed_values: Fr,

    /// The final state+ballot commitment the tally folds over.
    pub state_ballot_commitment: Fr,

    pub old_tally_commitment: Fr,

    pub new_tally_commitment: Fr,

    /// Single public-input digest binding all of the above.
    pub input_hash: Fr
}

impl TallyInputs
{
    pub fn to_vec(&self) -> Vec<Fr>
    {
        vec![
            self.packed_values,
            self.state_ballot_commitment,
            self.old_tally_commitment,
            self.new_tally_commitment,
            self.input_hash,
        ]
    }
}
