use rand::Rng;

use crate::grid::{shares_row_or_column, LineMask, CELLS};

pub const REWARD_POINTS_FACTOR: u32 = 3;
pub const REWARD_LINE_BONUS: f64 = 0.05;
pub const REWARD_MULTI_LINE_BONUS: f64 = 0.10;
pub const REWARD_X_CLEAR_BONUS: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyKind {
    SubtractPoints,
    EndRally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Penalty {
    pub cell: usize,
    pub kind: PenaltyKind,
    pub triggered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEffect {
    Plain,
    Reward,
    Penalty(PenaltyKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellEffects {
    reward: Option<usize>,
    // A collected reward cell still pays the line bonus once a line through it clears.
    collected: Option<usize>,
    penalties: [Option<Penalty>; 2],
    reward_multiplier: f64,
    shield: bool,
}

impl CellEffects {
    pub fn reward_cell(&self) -> Option<usize> {
        self.reward
    }

    pub fn collected_reward(&self) -> Option<usize> {
        self.collected
    }

    pub fn penalties(&self) -> impl Iterator<Item = &Penalty> {
        self.penalties.iter().flatten()
    }

    pub fn reward_multiplier(&self) -> f64 {
        self.reward_multiplier
    }

    pub fn has_shield(&self) -> bool {
        self.shield
    }

    pub fn at(&self, cell: usize) -> CellEffect {
        if self.reward == Some(cell) {
            return CellEffect::Reward;
        }
        self.penalties()
            .find(|p| p.cell == cell)
            .map_or(CellEffect::Plain, |p| CellEffect::Penalty(p.kind))
    }

    pub fn with_reward(self, cell: usize) -> Self {
        Self {
            reward: Some(cell),
            ..self
        }
    }

    // Fills the first free penalty slot; a third penalty is dropped.
    pub fn with_penalty(mut self, cell: usize, kind: PenaltyKind) -> Self {
        if let Some(slot) = self.penalties.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(Penalty {
                cell,
                kind,
                triggered: false,
            });
        }
        self
    }

    // One categorical draw per tier upgrade: 20% reward, 40% penalty, 40% nothing.
    pub fn redraw<R: Rng>(&self, tier: u8, rng: &mut R) -> Self {
        let next = Self {
            reward: None,
            collected: None,
            penalties: [None, None],
            ..*self
        };
        if tier == 0 {
            return next;
        }

        let roll = rng.gen_range(0..100);
        if roll < 20 {
            return next.with_reward(rng.gen_range(0..CELLS));
        }
        if roll >= 60 {
            return next;
        }
        let first = rng.gen_range(0..CELLS);
        match rng.gen_range(0..4) {
            0 | 1 => next.with_penalty(first, PenaltyKind::SubtractPoints),
            2 => next.with_penalty(first, PenaltyKind::EndRally),
            _ => {
                let partners: Vec<usize> = (0..CELLS)
                    .filter(|&c| c != first && shares_row_or_column(first, c))
                    .collect();
                let second = partners[rng.gen_range(0..partners.len())];
                next.with_penalty(first, PenaltyKind::SubtractPoints)
                    .with_penalty(second, PenaltyKind::EndRally)
            }
        }
    }

    // The triple points are paid once; the cell stays collected for the line bonus.
    pub fn consume_reward(&self) -> Self {
        Self {
            reward: None,
            collected: self.reward.or(self.collected),
            ..*self
        }
    }

    pub fn trigger_penalty(&self, cell: usize) -> Self {
        let mut next = *self;
        for p in next.penalties.iter_mut().flatten() {
            if p.cell == cell {
                p.triggered = true;
            }
        }
        next
    }

    pub fn reward_line_bonus(&self, cleared: LineMask) -> f64 {
        match self.collected {
            Some(cell) if cleared.touches(cell) => {
                if cleared.is_x_clear() {
                    REWARD_X_CLEAR_BONUS
                } else if cleared.line_count() >= 2 {
                    REWARD_MULTI_LINE_BONUS
                } else {
                    REWARD_LINE_BONUS
                }
            }
            _ => 0.0,
        }
    }

    // Pays the line bonus into the persistent multiplier and retires the collected cell.
    pub fn claim_line_bonus(&self, cleared: LineMask) -> (Self, f64) {
        let bonus = self.reward_line_bonus(cleared);
        if bonus == 0.0 {
            return (*self, 0.0);
        }
        let next = Self {
            collected: None,
            reward_multiplier: self.reward_multiplier + bonus,
            ..*self
        };
        (next, bonus)
    }

    // A grid cleared around a penalty that was never hit earns a shield.
    pub fn on_grid_cleared(&self) -> (Self, bool) {
        let earned = self.penalties().any(|p| !p.triggered);
        let next = Self {
            shield: self.shield || earned,
            ..*self
        };
        (next, earned)
    }

    pub fn use_shield(&self) -> (Self, bool) {
        if self.shield {
            (
                Self {
                    shield: false,
                    ..*self
                },
                true,
            )
        } else {
            (*self, false)
        }
    }
}
