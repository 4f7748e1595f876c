use serde::Serialize;

use rally::{LinkStats, MatchEvent, MatchPhase, Role, Side};

#[derive(Debug, Clone)]
pub enum HostEvent {
    Match {
        side: Side,
        at_ms: i64,
        event: MatchEvent,
    },
    Finished(DeviceReport),
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub side: Side,
    pub role: Role,
    pub phase: MatchPhase,
    pub finish: FinishReason,
    pub scores: [u32; 2],
    pub winner: Option<Side>,
    pub rally_score: Option<u32>,
    pub lives: Option<u32>,
    pub longest_rally: u32,
    pub peak_tiers: [u8; 2],
    pub swings: u32,
    pub link: LinkStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinishReason {
    GameOver,
    PeerLeft,
    TimedOut,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::GameOver => "game over",
            FinishReason::PeerLeft => "peer left",
            FinishReason::TimedOut => "timed out",
        }
    }
}

// One line per event worth showing at info level; the rest go to debug.
pub fn describe(side: Side, event: &MatchEvent) -> Option<String> {
    match event {
        MatchEvent::MatchStarted { mode, server, .. } => {
            Some(format!("[{side}] {mode:?} match started, {server} serves"))
        }
        MatchEvent::PointScored { message, .. } => Some(format!("[{side}] {message}")),
        MatchEvent::GameOver { message, .. } => Some(format!("[{side}] {message}")),
        MatchEvent::PeerVersion {
            version,
            compatible: false,
        } => Some(format!("[{side}] peer speaks protocol {version}")),
        MatchEvent::PeerLeft => Some(format!("[{side}] peer left")),
        _ => None,
    }
}
