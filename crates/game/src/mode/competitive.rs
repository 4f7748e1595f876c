use rand::Rng;

use super::{
    DisplayScore, MissContext, MissOutcome, ModeStrategy, ShotContext, ShrinkContext, Transition,
};
use crate::swing::Side;

pub const POINTS_TO_WIN: u32 = 11;
pub const WIN_MARGIN: u32 = 2;
pub const DEUCE_AT: u32 = 10;
pub const SERVES_PER_TURN: u32 = 2;
pub const RALLY_SHRINK_STEP_MS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompetitiveState;

impl CompetitiveState {
    pub fn winner(scores: [u32; 2]) -> Option<Side> {
        let [p1, p2] = scores;
        if p1 >= POINTS_TO_WIN && p1 >= p2 + WIN_MARGIN {
            Some(Side::One)
        } else if p2 >= POINTS_TO_WIN && p2 >= p1 + WIN_MARGIN {
            Some(Side::Two)
        } else {
            None
        }
    }

    pub fn is_deuce(scores: [u32; 2]) -> bool {
        scores[0] >= DEUCE_AT && scores[1] >= DEUCE_AT
    }

    // Rotation is relative to the current server: scores are only ever
    // applied one point at a time, so parity of the total decides.
    pub fn next_server(server: Side, scores_after: [u32; 2]) -> Side {
        let total = scores_after[0] + scores_after[1];
        if Self::is_deuce(scores_after) || total % SERVES_PER_TURN == 0 {
            server.other()
        } else {
            server
        }
    }
}

impl ModeStrategy for CompetitiveState {
    fn on_serve<R: Rng>(&self, _ctx: &ShotContext, _rng: &mut R) -> Transition<Self> {
        Transition::unchanged(*self)
    }

    fn on_hit<R: Rng>(&self, _ctx: &ShotContext, _rng: &mut R) -> Transition<Self> {
        Transition::unchanged(*self)
    }

    fn on_miss(&self, ctx: &MissContext) -> MissOutcome<Self> {
        let scorer = ctx.missed_by.other();
        let mut scores = ctx.scores;
        scores[scorer.index()] += 1;

        let winner = Self::winner(scores);
        let message = match winner {
            Some(side) => format!("{side} wins {}-{}", scores[0], scores[1]),
            None => format!("{scorer} scores ({}-{})", scores[0], scores[1]),
        };

        MissOutcome {
            state: *self,
            point_to: Some(scorer),
            game_over: winner.is_some(),
            winner,
            next_server: Self::next_server(ctx.server, scores),
            message,
            events: Vec::new(),
        }
    }

    fn hit_window_shrink_ms(&self, ctx: &ShrinkContext) -> i64 {
        if !ctx.rally_shrink_enabled {
            return 0;
        }
        RALLY_SHRINK_STEP_MS * (ctx.rally_length as i64 - 1).max(0)
    }

    fn display_score(&self, scores: [u32; 2]) -> DisplayScore {
        DisplayScore::Points {
            p1: scores[0],
            p2: scores[1],
        }
    }

    fn lives(&self) -> Option<u32> {
        None
    }

    fn has_risk(&self) -> bool {
        true
    }
}
