//! The per-poll engine: message log, ballot state, batch-oriented message
//! validation and state transition, and vote tallying.
//!
//! The engine is a deterministic replay machine. Message batches are drained
//! in descending order (last deployed batch first) and messages within a
//! batch are replayed in reverse publish order, so the latest valid command
//! for a nonce wins; ballot batches are tallied ascending from the pad
//! ballot. Protocol-level rejections are converted to no-ops and never stop a
//! batch; phase and capacity violations abort loudly.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::checkpoint::{fr_opt, fr_str, fr_vec, u128_str, u128_vec, Checkpoint};
use crate::crypto::{self, Keypair, PrivateKey, PublicKey};
use crate::domain::{Ballot, Command, Message, StateLeaf};
use crate::error::{PollError, TreeError};
use crate::hash;
use crate::packing::{
    self, SALT_DOMAIN_PROCESS, SALT_DOMAIN_TALLY_PER_OPTION, SALT_DOMAIN_TALLY_RESULTS,
    SALT_DOMAIN_TALLY_TOTAL
};
use crate::poll::config::PollConfig;
use crate::poll::inputs::{ProcessInputs, TallyInputs};
use crate::tree::MerkleAccumulator;

/// State and ballot trees are binary.
pub const STATE_TREE_ARITY: u8 = 2;

/// The message tree is quinary.
pub const MESSAGE_TREE_ARITY: u8 = 5;

/// The poll lifecycle. Strictly monotone; `Tallied` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollPhase
{
    /// Publishes and joins accepted.
    Open,

    /// Message batches being drained, one call at a time.
    Processing,

    /// Finalized ballots being folded into results.
    Tallying,

    /// Idempotent reads only.
    Tallied
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Poll
{
    id: u64,

    config: PollConfig,

    coordinator_public_key: PublicKey,

    /// Excluded from checkpoints; re-supplied via `set_coordinator_keypair`.
    #[serde(skip)]
    coordinator_private_key: Option<PrivateKey>,

    phase: PollPhase,

    /// Spent join nullifiers, in join order.
    #[serde(with = "fr_vec")]
    nullifiers: Vec<Fr>,

    /// Index 0 is the reserved pad leaf.
    state_leaves: Vec<StateLeaf>,

    /// Parallel to `state_leaves`; index 0 is the pad ballot.
    ballots: Vec<Ballot>,

    /// The published message log, append-only while open.
    messages: Vec<Message>,

    /// The ephemeral public key published with each message.
    ephemeral_keys: Vec<PublicKey>,

    message_tree: MerkleAccumulator,

    /// Excluded from checkpoints; re-supplied via `set_num_signups`.
    #[serde(skip)]
    num_signups: Option<u64>,

    batches_processed: u64,

    /// The running state+ballot commitment; `None` until first computed.
    #[serde(with = "fr_opt")]
    state_ballot_commitment: Option<Fr>,

    /// Accumulated vote weight per option.
    #[serde(with = "u128_vec")]
    results: Vec<u128>,

    /// Accumulated spent credits per option.
    #[serde(with = "u128_vec")]
    per_option_spent: Vec<u128>,

    #[serde(with = "u128_str")]
    total_spent: u128,

    ballots_tallied: u64,

    /// The running tally commitment, zero before the first tally batch.
    #[serde(with = "fr_str")]
    tally_commitment: Fr
}

impl Poll
{
    pub fn new(id: u64, config: PollConfig, coordinator: Keypair) -> Result<Self, PollError>
    {
        config.validate()?;

        let message_tree =
            MerkleAccumulator::new(MESSAGE_TREE_ARITY, config.tree_depths.message, hash::zero())?;
        let options = config.vote_options as usize;

        Ok(Poll {
            id,
            config,
            coordinator_public_key: coordinator.public,
            coordinator_private_key: Some(coordinator.private),
            phase: PollPhase::Open,
            nullifiers: Vec::new(),
            state_leaves: vec![StateLeaf::pad()],
            ballots: vec![Ballot::pad(options)],
            messages: Vec::new(),
            ephemeral_keys: Vec::new(),
            message_tree,
            num_signups: None,
            batches_processed: 0,
            state_ballot_commitment: None,
            results: vec![0; options],
            per_option_spent: vec![0; options],
            total_spent: 0,
            ballots_tallied: 0,
            tally_commitment: hash::zero()
        })
    }

    pub fn id(&self) -> u64
    {
        self.id
    }

    pub fn phase(&self) -> PollPhase
    {
        self.phase
    }

    pub fn config(&self) -> &PollConfig
    {
        &self.config
    }

    pub fn coordinator_public_key(&self) -> &PublicKey
    {
        &self.coordinator_public_key
    }

    pub fn num_messages(&self) -> u64
    {
        self.messages.len() as u64
    }

    pub fn num_joined(&self) -> u64
    {
        self.state_leaves.len() as u64 - 1
    }

    pub fn state_leaf(&self, index: u64) -> Option<&StateLeaf>
    {
        self.state_leaves.get(index as usize)
    }

    pub fn ballot(&self, index: u64) -> Option<&Ballot>
    {
        self.ballots.get(index as usize)
    }

    pub fn results(&self) -> &[u128]
    {
        &self.results
    }

    pub fn per_option_spent(&self) -> &[u128]
    {
        &self.per_option_spent
    }

    pub fn total_spent(&self) -> u128
    {
        self.total_spent
    }

    /// Append a message to the log unconditionally; validation is deferred to
    /// processing, mirroring the on-chain contract's blind accept.
    pub fn publish_message(&mut self, message: Message, ephemeral: PublicKey) -> Result<(), PollError>
    {
        if self.phase != PollPhase::Open
        {
            return Err(PollError::PollNotOpen);
        }

        self.message_tree.insert(message.leaf_hash(&ephemeral)?)?;
        self.messages.push(message);
        self.ephemeral_keys.push(ephemeral);

        tracing::trace!(poll = self.id, count = self.messages.len(), "message published");
        Ok(())
    }

    /// Bind a per-poll identity to a nullifier and grant it a voice credit
    /// balance. The nullifier proves knowledge of a registered private key
    /// without revealing it; a reused one is a double join.
    pub fn join_poll(
        &mut self,
        nullifier: Fr,
        public_key: PublicKey,
        voice_credit_balance: u64
    ) -> Result<u64, PollError>
    {
        if self.phase != PollPhase::Open
        {
            return Err(PollError::PollNotOpen);
        }
        if self.nullifiers.contains(&nullifier)
        {
            return Err(PollError::DuplicateNullifier);
        }
        if voice_credit_balance > self.config.max_voice_credits
        {
            return Err(PollError::BalanceExceeded);
        }

        let capacity = (STATE_TREE_ARITY as u64)
            .checked_pow(self.config.tree_depths.state as u32)
            .unwrap_or(u64::MAX);
        if self.state_leaves.len() as u64 >= capacity
        {
            return Err(PollError::Tree(TreeError::CapacityExceeded { capacity }));
        }

        self.nullifiers.push(nullifier);
        self.state_leaves.push(StateLeaf::new(public_key, voice_credit_balance, 0));
        self.ballots.push(Ballot::pad(self.config.vote_options as usize));

        let index = self.state_leaves.len() as u64 - 1;
        tracing::trace!(poll = self.id, index, "participant joined");
        Ok(index)
    }

    /// Seal the snapshot once the join window closes. Must be called exactly
    /// once, before the first `process_messages`.
    pub fn update_poll(&mut self, num_signups: u64) -> Result<(), PollError>
    {
        if self.phase != PollPhase::Open
        {
            return Err(PollError::PollNotOpen);
        }

        self.num_signups = Some(num_signups);
        self.phase = if self.messages.is_empty()
        {
            PollPhase::Tallying
        }
        else
        {
            PollPhase::Processing
        };

        tracing::debug!(
            poll = self.id,
            num_signups,
            messages = self.messages.len(),
            "poll sealed for processing"
        );
        Ok(())
    }

    fn total_message_batches(&self) -> u64
    {
        let batch = self.config.batch_sizes.messages;
        (self.messages.len() as u64).div_ceil(batch)
    }

    pub fn has_unprocessed_messages(&self) -> bool
    {
        self.batches_processed < self.total_message_batches()
    }

    pub fn has_untallied_ballots(&self) -> bool
    {
        self.ballots_tallied < self.ballots.len() as u64
    }

    /// The root of the binary tree over current state leaf hashes.
    pub fn state_root(&self) -> Result<Fr, PollError>
    {
        let mut tree =
            MerkleAccumulator::new(STATE_TREE_ARITY, self.config.tree_depths.state, hash::zero())?;
        for leaf in &self.state_leaves
        {
            tree.insert(leaf.hash()?)?;
        }
        Ok(tree.root())
    }

    /// The root of the binary tree over current ballot hashes.
    pub fn ballot_root(&self) -> Result<Fr, PollError>
    {
        let mut tree =
            MerkleAccumulator::new(STATE_TREE_ARITY, self.config.tree_depths.state, hash::zero())?;
        for ballot in &self.ballots
        {
            tree.insert(ballot.hash(self.config.tree_depths.vote_option)?)?;
        }
        Ok(tree.root())
    }

    pub fn message_root(&self) -> Fr
    {
        self.message_tree.root()
    }

    fn current_state_ballot_commitment(&mut self) -> Result<Fr, PollError>
    {
        if let Some(commitment) = self.state_ballot_commitment
        {
            return Ok(commitment);
        }

        let salt = packing::derive_salt(SALT_DOMAIN_PROCESS, self.id, self.batches_processed)?;
        let commitment =
            packing::commit_state_ballot(self.state_root()?, self.ballot_root()?, salt)?;
        self.state_ballot_commitment = Some(commitment);
        Ok(commitment)
    }

    /// Pop exactly one message batch, replay it against the state, and return
    /// the circuit inputs for this batch.
    pub fn process_messages(&mut self) -> Result<ProcessInputs, PollError>
    {
        match self.phase
        {
            PollPhase::Open => return Err(PollError::StateNotReady),
            PollPhase::Tallying | PollPhase::Tallied => return Err(PollError::NoMoreMessages),
            PollPhase::Processing => {}
        }

        let Some(num_signups) = self.num_signups else { return Err(PollError::StateNotReady) };
        let Some(private) = self.coordinator_private_key else
        {
            return Err(PollError::StateNotReady);
        };

        let total = self.total_message_batches();
        if self.batches_processed >= total
        {
            return Err(PollError::NoMoreMessages);
        }

        let batch = self.config.batch_sizes.messages;
        let batch_index = total - 1 - self.batches_processed;
        let start = (batch_index * batch) as usize;
        let end = usize::min(start + batch as usize, self.messages.len());

        let old_commitment = self.current_state_ballot_commitment()?;

        // Bind the messages of this batch in processing order. Slots past the
        // log's end are pad messages and contribute nothing.
        let mut batch_hash = hash::zero();
        for index in (start..end).rev()
        {
            let leaf = self.messages[index].leaf_hash(&self.ephemeral_keys[index])?;
            batch_hash = hash::hash2(batch_hash, leaf)?;
        }

        for index in (start..end).rev()
        {
            self.apply_message(index, &private)?;
        }

        self.batches_processed += 1;

        let salt = packing::derive_salt(SALT_DOMAIN_PROCESS, self.id, self.batches_processed)?;
        let new_commitment =
            packing::commit_state_ballot(self.state_root()?, self.ballot_root()?, salt)?;
        self.state_ballot_commitment = Some(new_commitment);

        let packed_values = packing::pack(&[
            ("vote_options", self.config.vote_options),
            ("num_signups", num_signups),
            ("batch_start", start as u64),
            ("batch_end", end as u64)
        ])?;
        let coordinator_public_key_hash = self.coordinator_public_key.digest()?;
        let input_hash = hash::hash5(
            packed_values,
            coordinator_public_key_hash,
            batch_hash,
            old_commitment,
            new_commitment
        )?;

        tracing::debug!(
            poll = self.id,
            batch = batch_index,
            start,
            end,
            "processed message batch"
        );

        if self.batches_processed == total
        {
            self.phase = PollPhase::Tallying;
            tracing::debug!(poll = self.id, "message processing complete");
        }

        Ok(ProcessInputs {
            packed_values,
            coordinator_public_key_hash,
            batch_hash,
            old_state_ballot_commitment: old_commitment,
            new_state_ballot_commitment: new_commitment,
            input_hash
        })
    }

    /// Drain every remaining batch and return the final leaf and ballot
    /// snapshot, for non-interactive replay that needs no per-batch proof.
    pub fn process_all_messages(&mut self) -> Result<(Vec<StateLeaf>, Vec<Ballot>), PollError>
    {
        while self.has_unprocessed_messages()
        {
            self.process_messages()?;
        }
        Ok((self.state_leaves.clone(), self.ballots.clone()))
    }

    /// Replay one message against the state. Protocol-level rejections are
    /// no-ops: the ballot and state leaf stay untouched and the batch slot is
    /// still consumed. Only configuration-tier failures abort.
    fn apply_message(&mut self, index: usize, private: &PrivateKey) -> Result<(), PollError>
    {
        let message = self.messages[index];
        let ephemeral = self.ephemeral_keys[index];
        let key = crypto::shared_key(private, &ephemeral);

        let Ok((command, signature)) = Command::decrypt(&message, &key) else
        {
            tracing::trace!(poll = self.id, index, "rejected: undecryptable");
            return Ok(());
        };

        if command.poll_id != self.id
        {
            tracing::trace!(poll = self.id, index, "rejected: wrong poll id");
            return Ok(());
        }

        let slot = command.state_index as usize;
        if slot == 0 || slot >= self.state_leaves.len()
        {
            tracing::trace!(poll = self.id, index, "rejected: state index out of bounds");
            return Ok(());
        }

        if command.nonce != self.ballots[slot].nonce + 1
        {
            tracing::trace!(poll = self.id, index, "rejected: stale nonce");
            return Ok(());
        }

        match command.verify(&self.state_leaves[slot].public_key, &signature)
        {
            Ok(true) => {}
            Ok(false) =>
            {
                tracing::trace!(poll = self.id, index, "rejected: invalid signature");
                return Ok(());
            }
            Err(e) => return Err(e.into())
        }

        if command.vote_option_index >= self.config.vote_options
        {
            tracing::trace!(poll = self.id, index, "rejected: vote option out of bounds");
            return Ok(());
        }

        let option = command.vote_option_index as usize;
        let old_weight = self.ballots[slot].votes[option];
        let refunded = self.config.mode.cost(old_weight);
        let cost = self.config.mode.cost(command.new_vote_weight);
        let available = self.state_leaves[slot].voice_credit_balance as u128 + refunded;

        if cost > available
        {
            tracing::trace!(poll = self.id, index, "rejected: insufficient balance");
            return Ok(());
        }

        let leaf = &mut self.state_leaves[slot];
        leaf.voice_credit_balance = (available - cost) as u64;
        leaf.public_key = command.new_public_key;

        let ballot = &mut self.ballots[slot];
        ballot.votes[option] = command.new_vote_weight;
        ballot.nonce += 1;

        tracing::trace!(poll = self.id, index, slot, option, "command accepted");
        Ok(())
    }

    fn results_root(&self, values: &[u128]) -> Result<Fr, PollError>
    {
        let mut tree = MerkleAccumulator::new(
            crate::domain::ballot::VOTE_TREE_ARITY,
            self.config.tree_depths.vote_option,
            hash::zero()
        )?;
        for value in values
        {
            tree.insert(Fr::from(*value))?;
        }
        Ok(tree.root())
    }

    /// Fold exactly one batch of finalized ballots into the running results
    /// and return the circuit inputs for this batch.
    pub fn tally_votes(&mut self) -> Result<TallyInputs, PollError>
    {
        match self.phase
        {
            PollPhase::Open | PollPhase::Processing =>
            {
                return Err(PollError::ProcessingIncomplete)
            }
            PollPhase::Tallied => return Err(PollError::AllBallotsTallied),
            PollPhase::Tallying => {}
        }

        let Some(num_signups) = self.num_signups else { return Err(PollError::StateNotReady) };

        let total = self.ballots.len() as u64;
        if self.ballots_tallied >= total
        {
            return Err(PollError::AllBallotsTallied);
        }

        let batch = self.config.batch_sizes.ballots;
        let start = self.ballots_tallied;
        let end = u64::min(start + batch, total);

        let old_commitment = self.tally_commitment;

        for ballot in &self.ballots[start as usize..end as usize]
        {
            for (option, weight) in ballot.votes.iter().enumerate()
            {
                let cost = self.config.mode.cost(*weight);
                self.results[option] += *weight as u128;
                self.per_option_spent[option] += cost;
                self.total_spent += cost;
            }
        }
        self.ballots_tallied = end;

        let results_salt = packing::derive_salt(SALT_DOMAIN_TALLY_RESULTS, self.id, end)?;
        let total_salt = packing::derive_salt(SALT_DOMAIN_TALLY_TOTAL, self.id, end)?;
        let per_option_salt = packing::derive_salt(SALT_DOMAIN_TALLY_PER_OPTION, self.id, end)?;

        let new_commitment = packing::commit_tally(
            self.results_root(&self.results)?,
            results_salt,
            Fr::from(self.total_spent),
            total_salt,
            self.results_root(&self.per_option_spent)?,
            per_option_salt
        )?;
        self.tally_commitment = new_commitment;

        let packed_values =
            packing::pack(&[("batch_start", start), ("num_signups", num_signups)])?;
        let state_ballot_commitment = self.current_state_ballot_commitment()?;
        let input_hash = hash::hash4(
            packed_values,
            state_ballot_commitment,
            old_commitment,
            new_commitment
        )?;

        tracing::debug!(poll = self.id, start, end, "tallied ballot batch");

        if self.ballots_tallied >= total
        {
            self.phase = PollPhase::Tallied;
            tracing::debug!(poll = self.id, "tally complete");
        }

        Ok(TallyInputs {
            packed_values,
            state_ballot_commitment,
            old_tally_commitment: old_commitment,
            new_tally_commitment: new_commitment,
            input_hash
        })
    }

    /// Re-supply the coordinator keypair after restoring from a checkpoint,
    /// which omits the private key.
    pub fn set_coordinator_keypair(&mut self, keypair: Keypair) -> Result<(), PollError>
    {
        if keypair.public != self.coordinator_public_key
        {
            return Err(PollError::CoordinatorKeyMismatch);
        }
        self.coordinator_private_key = Some(keypair.private);
        Ok(())
    }

    /// Re-supply the signup count after restoring from a checkpoint, which
    /// omits it.
    pub fn set_num_signups(&mut self, num_signups: u64)
    {
        self.num_signups = Some(num_signups);
    }

    /// Full structural clone.
    pub fn copy(&self) -> Self
    {
        self.clone()
    }

    /// Equality over the canonical serialized form.
    pub fn equals(&self, other: &Self) -> bool
    {
        self.structural_eq(other)
    }
}

impl Checkpoint for Poll {}
