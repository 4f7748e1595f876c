use serde::{Deserialize, Serialize};

use crate::event::EventLog;
use crate::mode::{DisplayScore, ModeState};
use crate::settings::MatchSettings;
use crate::swing::{ShotType, Side};
use crate::timing::HitWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    #[default]
    Idle,
    WaitingForServe,
    Rally,
    PointScored,
    GameOver,
}

impl MatchPhase {
    pub fn code(self) -> u8 {
        match self {
            MatchPhase::Idle => 0,
            MatchPhase::WaitingForServe => 1,
            MatchPhase::Rally => 2,
            MatchPhase::PointScored => 3,
            MatchPhase::GameOver => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MatchPhase::Idle),
            1 => Some(MatchPhase::WaitingForServe),
            2 => Some(MatchPhase::Rally),
            3 => Some(MatchPhase::PointScored),
            4 => Some(MatchPhase::GameOver),
            _ => None,
        }
    }

    pub fn is_live(self) -> bool {
        matches!(
            self,
            MatchPhase::WaitingForServe | MatchPhase::Rally | MatchPhase::PointScored
        )
    }
}

// The ball in flight: who struck it, who must answer, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub hitter: Side,
    pub receiver: Side,
    pub shot: ShotType,
    pub is_serve: bool,
    pub hit_ms: i64,
    pub flight_ms: i64,
    pub window: HitWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoMiss {
    pub side: Side,
    pub deadline_ms: i64,
}

#[derive(Debug, Clone)]
pub struct MatchState {
    pub(crate) settings: MatchSettings,
    pub(crate) scores: [u32; 2],
    pub(crate) server: Side,
    pub(crate) phase: MatchPhase,
    pub(crate) rally_length: u32,
    pub(crate) longest_rally: u32,
    pub(crate) last_shot: Option<ShotType>,
    pub(crate) exchange: Option<Exchange>,
    pub(crate) auto_miss: Option<AutoMiss>,
    pub(crate) resume_at_ms: Option<i64>,
    pub(crate) paused: bool,
    pub(crate) winner: Option<Side>,
    pub(crate) mode: ModeState,
    pub(crate) log: EventLog,
}

impl MatchState {
    pub fn new(settings: MatchSettings, local: Side, log_capacity: usize) -> Self {
        Self {
            mode: ModeState::new(settings.game_mode, local),
            settings,
            scores: [0; 2],
            server: Side::One,
            phase: MatchPhase::Idle,
            rally_length: 0,
            longest_rally: 0,
            last_shot: None,
            exchange: None,
            auto_miss: None,
            resume_at_ms: None,
            paused: false,
            winner: None,
            log: EventLog::new(log_capacity),
        }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn server(&self) -> Side {
        self.server
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn rally_length(&self) -> u32 {
        self.rally_length
    }

    pub fn longest_rally(&self) -> u32 {
        self.longest_rally
    }

    pub fn last_shot(&self) -> Option<ShotType> {
        self.last_shot
    }

    pub fn exchange(&self) -> Option<&Exchange> {
        self.exchange.as_ref()
    }

    pub fn auto_miss(&self) -> Option<AutoMiss> {
        self.auto_miss
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn mode(&self) -> &ModeState {
        &self.mode
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn display_score(&self) -> DisplayScore {
        self.mode.display_score(self.scores)
    }

    pub fn lives(&self) -> Option<u32> {
        self.mode.lives()
    }

    pub(crate) fn clear_exchange(&mut self) {
        self.exchange = None;
        self.auto_miss = None;
    }
}
