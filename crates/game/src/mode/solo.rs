use rand::Rng;

use super::{
    DisplayScore, MissContext, MissOutcome, ModeStrategy, RallyState, ShotContext, ShrinkContext,
    Transition, TIER_SHRINK_MS,
};
use crate::swing::Side;

// One player drives both sides of the table; only the local grid matters.
#[derive(Debug, Clone, PartialEq)]
pub struct SoloState {
    local: Side,
    rally: RallyState,
}

impl SoloState {
    pub fn new(local: Side) -> Self {
        Self {
            local,
            rally: RallyState::new(),
        }
    }

    pub fn local(&self) -> Side {
        self.local
    }

    pub fn rally(&self) -> &RallyState {
        &self.rally
    }

    pub fn rally_mut(&mut self) -> &mut RallyState {
        &mut self.rally
    }

    fn with(&self, rally: RallyState) -> Self {
        Self {
            local: self.local,
            rally,
        }
    }
}

impl ModeStrategy for SoloState {
    fn on_serve<R: Rng>(&self, ctx: &ShotContext, rng: &mut R) -> Transition<Self> {
        self.rally.serve(ctx, rng).map(|r| self.with(r))
    }

    fn on_hit<R: Rng>(&self, ctx: &ShotContext, rng: &mut R) -> Transition<Self> {
        self.rally.hit(ctx, rng).map(|r| self.with(r))
    }

    fn on_miss(&self, ctx: &MissContext) -> MissOutcome<Self> {
        let miss = self.rally.miss(ctx.missed_by);
        let lives = miss.state.lives();
        let game_over = lives == 0;
        let message = if game_over {
            format!("Game over! Score {}", miss.state.score())
        } else if miss.life_lost {
            format!("Missed, {lives} lives left")
        } else {
            "Missed, shield absorbed it".to_string()
        };

        MissOutcome {
            state: self.with(miss.state),
            point_to: None,
            game_over,
            winner: None,
            next_server: self.local,
            message,
            events: miss.events,
        }
    }

    fn hit_window_shrink_ms(&self, _ctx: &ShrinkContext) -> i64 {
        TIER_SHRINK_MS * self.rally.highest_tier(self.local) as i64
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::HitResult;

    #[test]
    fn local_side_always_serves() {
        let state = SoloState::new(Side::Two);
        let outcome = state.on_miss(&MissContext {
            missed_by: Side::One,
            server: Side::One,
            scores: [0, 0],
            result: HitResult::MissEarly,
        });
        assert_eq!(outcome.next_server, Side::Two);
        assert_eq!(outcome.state.local(), Side::Two);
        assert_eq!(outcome.state.lives(), Some(2));
    }

    #[test]
    fn shrink_uses_local_tier_only() {
        let mut state = SoloState::new(Side::One);
        let grids = [Default::default(); 2];
        state.rally_mut().apply_sync(0, 3, grids, [0, 3]);
        let ctx = ShrinkContext {
            rally_length: 4,
            rally_shrink_enabled: true,
        };
        assert_eq!(state.hit_window_shrink_ms(&ctx), 0);
    }
}
