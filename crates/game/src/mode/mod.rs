mod competitive;
mod cooperative;
mod rally;
mod solo;

use rand::Rng;

pub use competitive::{CompetitiveState, DEUCE_AT, POINTS_TO_WIN, RALLY_SHRINK_STEP_MS, WIN_MARGIN};
pub use cooperative::CooperativeState;
pub use rally::{GridSide, RallyState, STARTING_LIVES, TIER_SHRINK_MS};
pub use solo::SoloState;

use crate::bonus::PenaltyKind;
use crate::grid::LineMask;
use crate::settings::{BonusToggles, GameMode};
use crate::swing::{ShotType, Side, SpinType};
use crate::timing::HitResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotContext {
    pub hitter: Side,
    pub shot: ShotType,
    pub spin: SpinType,
    pub at_ms: i64,
    pub is_leader: bool,
    pub bonuses: BonusToggles,
    pub base_window_ms: i64,
    pub overuse_bonus_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissContext {
    pub missed_by: Side,
    pub server: Side,
    pub scores: [u32; 2],
    pub result: HitResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShrinkContext {
    pub rally_length: u32,
    pub rally_shrink_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeReason {
    TierFirstReached(u8),
    CopySequence,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeEvent {
    LinesCleared {
        side: Side,
        lines: LineMask,
        points: u32,
    },
    XClear {
        side: Side,
    },
    TierReached {
        side: Side,
        tier: u8,
    },
    LifeGained {
        reason: LifeReason,
        lives: u32,
    },
    LifeLost {
        lives: u32,
    },
    ShieldEarned {
        side: Side,
    },
    ShieldUsed {
        side: Side,
    },
    RewardCollected {
        side: Side,
        cell: usize,
    },
    RewardLineBonus {
        side: Side,
        multiplier: f64,
    },
    PenaltyHit {
        side: Side,
        cell: usize,
        kind: PenaltyKind,
    },
    OutageStarted {
        side: Side,
        cell: usize,
    },
    OutageRecovered {
        side: Side,
        window_bonus_ms: i64,
    },
    OutageCleared {
        side: Side,
    },
    SpinLocked,
    CopyTierClaimed {
        tier: u8,
        multiplier: f64,
    },
    CopyBroken,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    pub state: S,
    pub points: i64,
    pub end_rally: bool,
    pub events: Vec<ModeEvent>,
}

impl<S> Transition<S> {
    pub fn unchanged(state: S) -> Self {
        Self {
            state,
            points: 0,
            end_rally: false,
            events: Vec::new(),
        }
    }

    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Transition<T> {
        Transition {
            state: f(self.state),
            points: self.points,
            end_rally: self.end_rally,
            events: self.events,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissOutcome<S> {
    pub state: S,
    pub point_to: Option<Side>,
    pub game_over: bool,
    pub winner: Option<Side>,
    pub next_server: Side,
    pub message: String,
    pub events: Vec<ModeEvent>,
}

impl<S> MissOutcome<S> {
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> MissOutcome<T> {
        MissOutcome {
            state: f(self.state),
            point_to: self.point_to,
            game_over: self.game_over,
            winner: self.winner,
            next_server: self.next_server,
            message: self.message,
            events: self.events,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayScore {
    Points { p1: u32, p2: u32 },
    Rally { score: u32, lives: u32 },
}

pub trait ModeStrategy: Sized {
    fn on_serve<R: Rng>(&self, ctx: &ShotContext, rng: &mut R) -> Transition<Self>;

    fn on_hit<R: Rng>(&self, ctx: &ShotContext, rng: &mut R) -> Transition<Self>;

    fn on_miss(&self, ctx: &MissContext) -> MissOutcome<Self>;

    fn hit_window_shrink_ms(&self, ctx: &ShrinkContext) -> i64;

    fn window_bonus_ms(&self, _receiver: Side) -> i64 {
        0
    }

    fn display_score(&self, scores: [u32; 2]) -> DisplayScore;

    fn lives(&self) -> Option<u32>;

    fn has_risk(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModeState {
    Competitive(CompetitiveState),
    Cooperative(CooperativeState),
    Solo(SoloState),
}

impl ModeState {
    pub fn new(mode: GameMode, local: Side) -> Self {
        match mode {
            GameMode::Competitive => ModeState::Competitive(CompetitiveState),
            GameMode::Cooperative => ModeState::Cooperative(CooperativeState::new()),
            GameMode::Solo => ModeState::Solo(SoloState::new(local)),
        }
    }

    pub fn mode(&self) -> GameMode {
        match self {
            ModeState::Competitive(_) => GameMode::Competitive,
            ModeState::Cooperative(_) => GameMode::Cooperative,
            ModeState::Solo(_) => GameMode::Solo,
        }
    }

    pub fn rally(&self) -> Option<&RallyState> {
        match self {
            ModeState::Competitive(_) => None,
            ModeState::Cooperative(s) => Some(s.rally()),
            ModeState::Solo(s) => Some(s.rally()),
        }
    }

    pub fn rally_mut(&mut self) -> Option<&mut RallyState> {
        match self {
            ModeState::Competitive(_) => None,
            ModeState::Cooperative(s) => Some(s.rally_mut()),
            ModeState::Solo(s) => Some(s.rally_mut()),
        }
    }

    pub fn on_serve<R: Rng>(&self, ctx: &ShotContext, rng: &mut R) -> Transition<Self> {
        match self {
            ModeState::Competitive(s) => s.on_serve(ctx, rng).map(ModeState::Competitive),
            ModeState::Cooperative(s) => s.on_serve(ctx, rng).map(ModeState::Cooperative),
            ModeState::Solo(s) => s.on_serve(ctx, rng).map(ModeState::Solo),
        }
    }

    pub fn on_hit<R: Rng>(&self, ctx: &ShotContext, rng: &mut R) -> Transition<Self> {
        match self {
            ModeState::Competitive(s) => s.on_hit(ctx, rng).map(ModeState::Competitive),
            ModeState::Cooperative(s) => s.on_hit(ctx, rng).map(ModeState::Cooperative),
            ModeState::Solo(s) => s.on_hit(ctx, rng).map(ModeState::Solo),
        }
    }

    pub fn on_miss(&self, ctx: &MissContext) -> MissOutcome<Self> {
        match self {
            ModeState::Competitive(s) => s.on_miss(ctx).map(ModeState::Competitive),
            ModeState::Cooperative(s) => s.on_miss(ctx).map(ModeState::Cooperative),
            ModeState::Solo(s) => s.on_miss(ctx).map(ModeState::Solo),
        }
    }

    pub fn hit_window_shrink_ms(&self, ctx: &ShrinkContext) -> i64 {
        match self {
            ModeState::Competitive(s) => s.hit_window_shrink_ms(ctx),
            ModeState::Cooperative(s) => s.hit_window_shrink_ms(ctx),
            ModeState::Solo(s) => s.hit_window_shrink_ms(ctx),
        }
    }

    pub fn window_bonus_ms(&self, receiver: Side) -> i64 {
        match self {
            ModeState::Competitive(s) => s.window_bonus_ms(receiver),
            ModeState::Cooperative(s) => s.window_bonus_ms(receiver),
            ModeState::Solo(s) => s.window_bonus_ms(receiver),
        }
    }

    pub fn display_score(&self, scores: [u32; 2]) -> DisplayScore {
        match self {
            ModeState::Competitive(s) => s.display_score(scores),
            ModeState::Cooperative(s) => s.display_score(scores),
            ModeState::Solo(s) => s.display_score(scores),
        }
    }

    pub fn lives(&self) -> Option<u32> {
        match self {
            ModeState::Competitive(s) => s.lives(),
            ModeState::Cooperative(s) => s.lives(),
            ModeState::Solo(s) => s.lives(),
        }
    }

    pub fn has_risk(&self) -> bool {
        match self {
            ModeState::Competitive(s) => s.has_risk(),
            ModeState::Cooperative(s) => s.has_risk(),
            ModeState::Solo(s) => s.has_risk(),
        }
    }
}
