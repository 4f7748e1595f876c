mod protocol;
mod stats;
mod wire;

pub use protocol::{
    tag, DecodeError, Message, PlayerProfile, StateSync, SwingAction, NO_RING, PROTOCOL_VERSION,
};
pub use stats::{LinkSimulation, LinkStats};
