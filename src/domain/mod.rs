pub mod ballot;
pub mod command;
pub mod state_leaf;

pub use ballot::Ballot;
pub use command::{Command, Message};
pub use state_leaf::StateLeaf;
