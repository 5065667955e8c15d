//! Transport state and OSC command routing

pub mod router;
pub mod state;

pub use router::{is_on, Command, CommandRouter, RouterAction};
pub use state::ShowState;
