pub mod config;
pub mod inputs;
pub mod poll;

pub use config::{BatchSizes, PollConfig, TreeDepths, VotingMode};
pub use inputs::{ProcessInputs, TallyInputs};
pub use poll::{Poll, PollPhase, STATE_TREE_ARITY, MESSAGE_TREE_ARITY};
