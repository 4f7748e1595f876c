mod copy;
mod effects;
mod overuse;
mod spin;

pub use copy::{CopyBonus, CopyOutcome, CopyTier, COPY_TIERS, FULL_SEQUENCE};
pub use effects::{
    CellEffect, CellEffects, Penalty, PenaltyKind, REWARD_LINE_BONUS, REWARD_MULTI_LINE_BONUS,
    REWARD_POINTS_FACTOR, REWARD_X_CLEAR_BONUS,
};
pub use overuse::{OveruseStep, OveruseTracker, OVERUSE_LIMIT, RECOVERY_CELLS};
pub use spin::{SpinBonus, SpinStep, SPIN_EXTEND_MS, SPIN_STEP, SPIN_TYPES_CAP};
