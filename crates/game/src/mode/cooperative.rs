use rand::Rng;

use super::{
    DisplayScore, MissContext, MissOutcome, ModeStrategy, RallyState, ShotContext, ShrinkContext,
    Transition, TIER_SHRINK_MS,
};
use crate::swing::Side;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CooperativeState {
    rally: RallyState,
}

impl CooperativeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rally(&self) -> &RallyState {
        &self.rally
    }

    pub fn rally_mut(&mut self) -> &mut RallyState {
        &mut self.rally
    }

    fn wrap(rally: RallyState) -> Self {
        Self { rally }
    }
}

impl ModeStrategy for CooperativeState {
    fn on_serve<R: Rng>(&self, ctx: &ShotContext, rng: &mut R) -> Transition<Self> {
        self.rally.serve(ctx, rng).map(Self::wrap)
    }

    fn on_hit<R: Rng>(&self, ctx: &ShotContext, rng: &mut R) -> Transition<Self> {
        self.rally.hit(ctx, rng).map(Self::wrap)
    }

    fn on_miss(&self, ctx: &MissContext) -> MissOutcome<Self> {
        let miss = self.rally.miss(ctx.missed_by);
        let lives = miss.state.lives();
        let game_over = lives == 0;
        let message = if game_over {
            format!("Game over! Team score {}", miss.state.score())
        } else if miss.life_lost {
            format!("{} missed, {lives} lives left", ctx.missed_by)
        } else {
            format!("{} missed, shield absorbed it", ctx.missed_by)
        };

        MissOutcome {
            state: Self::wrap(miss.state),
            point_to: None,
            game_over,
            winner: None,
            next_server: ctx.missed_by,
            message,
            events: miss.events,
        }
    }

    fn hit_window_shrink_ms(&self, _ctx: &ShrinkContext) -> i64 {
        TIER_SHRINK_MS * self.rally.global_highest_tier() as i64
    }

    fn window_bonus_ms(&self, receiver: Side) -> i64 {
        self.rally.window_bonus_ms(receiver)
    }

    fn display_score(&self, _scores: [u32; 2]) -> DisplayScore {
        DisplayScore::Rally {
            score: self.rally.score(),
            lives: self.rally.lives(),
        }
    }

    fn lives(&self) -> Option<u32> {
        Some(self.rally.lives())
    }

    fn has_risk(&self) -> bool {
        false
    }
}
