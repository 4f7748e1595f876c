use rand::Rng;

use super::{LifeReason, ModeEvent, ShotContext, Transition};
use crate::bonus::{
    CellEffect, CellEffects, CopyBonus, OveruseStep, OveruseTracker, PenaltyKind, SpinBonus,
    REWARD_POINTS_FACTOR,
};
use crate::grid::{cell_for_shot, cell_points, triangular, Grid};
use crate::swing::Side;

pub const STARTING_LIVES: u32 = 3;
pub const TIER_SHRINK_MS: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridSide {
    pub grid: Grid,
    pub effects: CellEffects,
    pub overuse: OveruseTracker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RallyState {
    lives: u32,
    score: u32,
    sides: [GridSide; 2],
    highest_tier: [u8; 2],
    spin: SpinBonus,
    copy: CopyBonus,
}

impl Default for RallyState {
    fn default() -> Self {
        Self::new()
    }
}

pub(super) struct RallyMiss {
    pub state: RallyState,
    pub life_lost: bool,
    pub events: Vec<ModeEvent>,
}

impl RallyState {
    pub fn new() -> Self {
        Self {
            lives: STARTING_LIVES,
            score: 0,
            sides: [GridSide::default(); 2],
            highest_tier: [0; 2],
            spin: SpinBonus::default(),
            copy: CopyBonus::default(),
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn side(&self, side: Side) -> &GridSide {
        &self.sides[side.index()]
    }

    pub fn highest_tier(&self, side: Side) -> u8 {
        self.highest_tier[side.index()]
    }

    pub fn global_highest_tier(&self) -> u8 {
        self.highest_tier[0].max(self.highest_tier[1])
    }

    pub fn spin(&self) -> &SpinBonus {
        &self.spin
    }

    pub fn copy(&self) -> &CopyBonus {
        &self.copy
    }

    pub fn multiplier(&self, side: Side) -> f64 {
        1.0 + self.spin.multiplier()
            + self.copy.multiplier()
            + self.sides[side.index()].effects.reward_multiplier()
    }

    pub fn window_bonus_ms(&self, side: Side) -> i64 {
        self.sides[side.index()].overuse.window_bonus_ms()
    }

    pub fn apply_sync(&mut self, score: u32, lives: u32, grids: [Grid; 2], highest: [u8; 2]) {
        self.score = score;
        self.lives = lives;
        for (side, grid) in self.sides.iter_mut().zip(grids) {
            side.grid = grid;
        }
        for (mine, theirs) in self.highest_tier.iter_mut().zip(highest) {
            *mine = (*mine).max(theirs);
        }
    }

    #[cfg(test)]
    pub(crate) fn side_mut(&mut self, side: Side) -> &mut GridSide {
        &mut self.sides[side.index()]
    }

    fn track_shot(&mut self, ctx: &ShotContext, events: &mut Vec<ModeEvent>) {
        if ctx.bonuses.spin {
            let step = self.spin.record(ctx.spin, ctx.at_ms);
            self.spin = step.bonus;
            if step.locked {
                events.push(ModeEvent::SpinLocked);
            }
        }

        if ctx.bonuses.copy {
            if ctx.is_leader {
                self.copy = self.copy.record_leader(ctx.shot);
            } else {
                let (copy, outcome) = self.copy.record_follower(ctx.shot);
                self.copy = copy;
                if let Some(tier) = outcome.claimed_tier {
                    events.push(ModeEvent::CopyTierClaimed {
                        tier,
                        multiplier: copy.multiplier(),
                    });
                }
                if outcome.full_sequence {
                    self.lives += 1;
                    events.push(ModeEvent::LifeGained {
                        reason: LifeReason::CopySequence,
                        lives: self.lives,
                    });
                }
                if outcome.broken {
                    events.push(ModeEvent::CopyBroken);
                }
            }
        }
    }

    fn award(&mut self, base: u32, side: Side) -> i64 {
        let gained = (base as f64 * self.multiplier(side)).round() as u32;
        self.score += gained;
        gained as i64
    }

    pub(super) fn serve<R: Rng>(&self, ctx: &ShotContext, _rng: &mut R) -> Transition<Self> {
        let mut next = self.clone();
        let mut events = Vec::new();
        next.track_shot(ctx, &mut events);

        let tier = next.sides[ctx.hitter.index()].grid.min_tier();
        let points = next.award(cell_points(tier), ctx.hitter);

        Transition {
            state: next,
            points,
            end_rally: false,
            events,
        }
    }

    pub(super) fn hit<R: Rng>(&self, ctx: &ShotContext, rng: &mut R) -> Transition<Self> {
        let mut next = self.clone();
        let mut events = Vec::new();
        next.track_shot(ctx, &mut events);

        let s = ctx.hitter;
        let cell = cell_for_shot(ctx.shot);
        let mut side = next.sides[s.index()];

        if ctx.bonuses.overuse {
            let (overuse, step) =
                side.overuse.record(cell, ctx.overuse_bonus_ms, ctx.base_window_ms);
            side.overuse = overuse;
            match step {
                OveruseStep::OutageStarted => {
                    events.push(ModeEvent::OutageStarted { side: s, cell })
                }
                OveruseStep::Recovered => events.push(ModeEvent::OutageRecovered {
                    side: s,
                    window_bonus_ms: overuse.window_bonus_ms(),
                }),
                OveruseStep::Normal | OveruseStep::Blocked { .. } => {}
            }
            if !step.scores() {
                next.sides[s.index()] = side;
                return Transition {
                    state: next,
                    points: 0,
                    end_rally: false,
                    events,
                };
            }
        }

        let effect = if ctx.bonuses.grid_effects {
            side.effects.at(cell)
        } else {
            CellEffect::Plain
        };

        let mut points: i64 = 0;
        let mut base = cell_points(side.grid.tier(cell));
        match effect {
            CellEffect::Penalty(kind) => {
                side.effects = side.effects.trigger_penalty(cell);
                events.push(ModeEvent::PenaltyHit { side: s, cell, kind });
                if kind == PenaltyKind::EndRally {
                    next.sides[s.index()] = side;
                    return Transition {
                        state: next,
                        points: 0,
                        end_rally: true,
                        events,
                    };
                }
                let penalty = triangular(side.grid.min_tier() as u32 + 2);
                let taken = penalty.min(next.score);
                next.score -= taken;
                points -= taken as i64;
                base = 0;
            }
            CellEffect::Reward => {
                side.effects = side.effects.consume_reward();
                events.push(ModeEvent::RewardCollected { side: s, cell });
                base *= REWARD_POINTS_FACTOR;
            }
            CellEffect::Plain => {}
        }

        let (grid, grid_hit) = side.grid.resolve_hit(cell, rng);
        side.grid = grid;

        if !grid_hit.cleared.is_empty() {
            let (effects, line_bonus) = side.effects.claim_line_bonus(grid_hit.cleared);
            side.effects = effects;
            if line_bonus > 0.0 {
                events.push(ModeEvent::RewardLineBonus {
                    side: s,
                    multiplier: side.effects.reward_multiplier(),
                });
            }
            events.push(ModeEvent::LinesCleared {
                side: s,
                lines: grid_hit.cleared,
                points: grid_hit.line_points,
            });
            if grid_hit.x_clear() {
                events.push(ModeEvent::XClear { side: s });
            }
        }

        if let Some(tier) = grid_hit.tier_up {
            let global_before = next.global_highest_tier();
            let highest = &mut next.highest_tier[s.index()];
            *highest = (*highest).max(tier);
            events.push(ModeEvent::TierReached { side: s, tier });

            if tier > global_before {
                next.lives += 1;
                events.push(ModeEvent::LifeGained {
                    reason: LifeReason::TierFirstReached(tier),
                    lives: next.lives,
                });
            }

            if ctx.bonuses.grid_effects {
                let (effects, shield) = side.effects.on_grid_cleared();
                if shield {
                    events.push(ModeEvent::ShieldEarned { side: s });
                }
                side.effects = effects.redraw(tier, rng);
            }
        }

        next.sides[s.index()] = side;
        points += next.award(base + grid_hit.line_points, s);

        Transition {
            state: next,
            points,
            end_rally: false,
            events,
        }
    }

    pub(super) fn miss(&self, missed_by: Side) -> RallyMiss {
        let mut next = self.clone();
        let mut events = Vec::new();
        let side = &mut next.sides[missed_by.index()];

        let (effects, forgiven) = side.effects.use_shield();
        side.effects = effects;

        let (overuse, cleared) = side.overuse.on_miss();
        side.overuse = overuse;
        if cleared {
            events.push(ModeEvent::OutageCleared { side: missed_by });
        }

        if forgiven {
            events.push(ModeEvent::ShieldUsed { side: missed_by });
        } else {
            next.lives = next.lives.saturating_sub(1);
            events.push(ModeEvent::LifeLost { lives: next.lives });
        }

        next.spin = next.spin.on_miss();
        next.copy = next.copy.on_miss();

        RallyMiss {
            state: next,
            life_lost: !forgiven,
            events,
        }
    }
}
