pub mod bonus;
pub mod engine;
pub mod event;
pub mod grid;
pub mod mode;
pub mod net;
pub mod session;
pub mod settings;
pub mod swing;
pub mod timing;

pub use engine::{
    EngineConfig, IgnoreReason, MatchEngine, MatchPhase, MatchState, PeerInfo, Role,
    SwingDisposition,
};
pub use event::{EventLog, LoggedEvent, MatchEvent};
pub use grid::{Grid, LineMask};
pub use mode::{DisplayScore, ModeEvent, ModeState, ModeStrategy};
pub use net::{DecodeError, LinkSimulation, LinkStats, Message, PlayerProfile, PROTOCOL_VERSION};
pub use session::{LocalCommand, Session, SessionInput};
pub use settings::{BonusToggles, GameMode, MatchSettings, ShotTuning, SwingTuning};
pub use swing::{ClassifierConfig, ShotType, Side, SpinType, SwingClassifier, SwingEvent};
pub use timing::{HitResult, TimingConfig};
