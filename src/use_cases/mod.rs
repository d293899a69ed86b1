// Use cases layer: application workflows for the skirmish server.

pub mod game;
pub mod sync;
pub mod types;

pub use sync::PeerRoster;
pub use types::{SessionState, SimCommand, TickReport};
