mod config;
mod machine;
mod state;

pub use config::{EngineConfig, Role};
pub use machine::{IgnoreReason, MatchEngine, PeerInfo, SwingDisposition};
pub use state::{AutoMiss, Exchange, MatchPhase, MatchState};
