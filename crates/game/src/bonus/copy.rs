use crate::swing::ShotType;

pub const FULL_SEQUENCE: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopyTier {
    pub copies: u8,
    pub types: u32,
    pub bonus: f64,
}

pub const COPY_TIERS: [CopyTier; 5] = [
    CopyTier { copies: 5, types: 3, bonus: 0.1 },
    CopyTier { copies: 6, types: 4, bonus: 0.2 },
    CopyTier { copies: 7, types: 5, bonus: 0.3 },
    CopyTier { copies: 8, types: 6, bonus: 0.4 },
    CopyTier { copies: 9, types: 7, bonus: 0.5 },
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CopyBonus {
    leader_shot: Option<ShotType>,
    streak: u8,
    types: u16,
    claimed: u8,
    multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CopyOutcome {
    pub claimed_tier: Option<u8>,
    pub full_sequence: bool,
    pub broken: bool,
}

impl CopyBonus {
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn streak(&self) -> u8 {
        self.streak
    }

    pub fn claimed_tiers(&self) -> u8 {
        self.claimed
    }

    pub fn distinct_types(&self) -> u32 {
        self.types.count_ones()
    }

    pub fn record_leader(&self, shot: ShotType) -> Self {
        Self {
            leader_shot: Some(shot),
            ..*self
        }
    }

    pub fn record_follower(&self, shot: ShotType) -> (Self, CopyOutcome) {
        let mut next = *self;
        let mut outcome = CopyOutcome::default();
        next.leader_shot = None;

        if self.leader_shot != Some(shot) {
            outcome.broken = self.streak > 0;
            next.reset_sequence();
            return (next, outcome);
        }

        next.streak += 1;
        next.types |= 1 << shot.index();

        while let Some(tier) = COPY_TIERS.get(next.claimed as usize) {
            if next.streak < tier.copies || next.distinct_types() < tier.types {
                break;
            }
            next.claimed += 1;
            if tier.bonus > next.multiplier {
                next.multiplier = tier.bonus;
            }
            outcome.claimed_tier = Some(next.claimed);
        }

        if next.streak >= FULL_SEQUENCE {
            outcome.full_sequence = true;
            next.reset_sequence();
        } else if !next.can_reach_next_tier() {
            outcome.broken = true;
            next.reset_sequence();
        }

        (next, outcome)
    }

    pub fn on_miss(&self) -> Self {
        let mut next = *self;
        next.leader_shot = None;
        next.reset_sequence();
        next
    }

    fn can_reach_next_tier(&self) -> bool {
        let Some(tier) = COPY_TIERS.get(self.claimed as usize) else {
            return true;
        };
        let remaining = (FULL_SEQUENCE - self.streak) as u32;
        self.distinct_types() + remaining >= tier.types
    }

    fn reset_sequence(&mut self) {
        self.streak = 0;
        self.types = 0;
    }
}
