use crate::swing::SpinType;

pub const SPIN_STEP: f64 = 0.1;
pub const SPIN_TYPES_CAP: u32 = 5;
pub const SPIN_EXTEND_MS: i64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpinBonus {
    used: u16,
    spinning_until_ms: Option<i64>,
    permanent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinStep {
    pub bonus: SpinBonus,
    pub locked: bool,
}

impl SpinBonus {
    pub fn distinct(&self) -> u32 {
        self.used.count_ones()
    }

    pub fn multiplier(&self) -> f64 {
        self.distinct().min(SPIN_TYPES_CAP) as f64 * SPIN_STEP
    }

    pub fn is_permanent(&self) -> bool {
        self.permanent
    }

    pub fn is_spinning(&self, now_ms: i64) -> bool {
        self.permanent || self.spinning_until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn record(&self, spin: SpinType, now_ms: i64) -> SpinStep {
        let mut next = *self;
        if !spin.is_spinning() {
            return SpinStep {
                bonus: next,
                locked: false,
            };
        }

        let was_spinning = self.is_spinning(now_ms);
        let bit = 1u16 << spin.code();
        next.used |= bit;

        let from = self.spinning_until_ms.map_or(now_ms, |until| until.max(now_ms));
        next.spinning_until_ms = Some(from + SPIN_EXTEND_MS);

        let locked = !self.permanent && was_spinning && next.distinct() >= SPIN_TYPES_CAP;
        if locked {
            next.permanent = true;
        }

        SpinStep {
            bonus: next,
            locked,
        }
    }

    pub fn on_miss(&self) -> Self {
        if self.permanent {
            *self
        } else {
            Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE: [SpinType; 5] = [
        SpinType::Top,
        SpinType::Back,
        SpinType::Left,
        SpinType::Right,
        SpinType::TopLeft,
    ];

    #[test]
    fn bonus_counts_distinct_and_caps() {
        let mut bonus = SpinBonus::default();
        for (i, spin) in FIVE.iter().chain([SpinType::BackRight, SpinType::Top].iter()).enumerate() {
            bonus = bonus.record(*spin, i as i64 * 100).bonus;
        }
        assert_eq!(bonus.distinct(), 6);
        assert!((bonus.multiplier() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn none_spin_changes_nothing() {
        let bonus = SpinBonus::default();
        let step = bonus.record(SpinType::None, 0);
        assert_eq!(step.bonus, bonus);
        assert!(!step.bonus.is_spinning(0));
    }

    #[test]
    fn five_types_while_spinning_locks() {
        let mut bonus = SpinBonus::default();
        let mut locked = false;
        for (i, spin) in FIVE.iter().enumerate() {
            let step = bonus.record(*spin, i as i64 * 1000);
            locked |= step.locked;
            bonus = step.bonus;
        }
        assert!(locked);
        assert!(bonus.is_permanent());
        assert_eq!(bonus.on_miss(), bonus);
        assert!(bonus.is_spinning(1_000_000));
    }

    #[test]
    fn expired_timer_does_not_lock() {
        let mut bonus = SpinBonus::default();
        for (i, spin) in FIVE.iter().enumerate() {
            bonus = bonus.record(*spin, i as i64 * 10_000).bonus;
        }
        assert!(!bonus.is_permanent());
        assert_eq!(bonus.on_miss(), SpinBonus::default());
    }
}
