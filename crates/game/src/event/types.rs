use crate::mode::ModeEvent;
use crate::settings::GameMode;
use crate::swing::{ShotType, Side, SpinType};
use crate::timing::HitResult;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    MatchStarted {
        mode: GameMode,
        server: Side,
        rematch: bool,
    },
    Served {
        side: Side,
        shot: ShotType,
        spin: SpinType,
        points: i64,
    },
    Returned {
        side: Side,
        shot: ShotType,
        spin: SpinType,
        delta_ms: i64,
        points: i64,
        rally_length: u32,
    },
    Missed {
        side: Side,
        result: HitResult,
    },
    PointScored {
        scorer: Option<Side>,
        scores: [u32; 2],
        next_server: Side,
        message: String,
    },
    GameOver {
        winner: Option<Side>,
        message: String,
    },
    Mode(ModeEvent),
    SettingsApplied,
    StateSynced,
    Paused {
        by_peer: bool,
    },
    Resumed {
        by_peer: bool,
    },
    PeerLeft,
    PeerVersion {
        version: i32,
        compatible: bool,
    },
    PeerReady(bool),
    PeerProfile {
        name: String,
        avatar: i32,
        ring: i32,
    },
}
