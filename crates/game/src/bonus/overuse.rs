use crate::grid::CELLS;

pub const OVERUSE_LIMIT: u8 = 10;
pub const RECOVERY_CELLS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OveruseTracker {
    hits: [u8; CELLS],
    outage: bool,
    recovery: u16,
    window_bonus_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OveruseStep {
    Normal,
    OutageStarted,
    Blocked { progress: u32 },
    Recovered,
}

impl OveruseStep {
    pub fn scores(self) -> bool {
        matches!(self, OveruseStep::Normal | OveruseStep::OutageStarted)
    }
}

impl OveruseTracker {
    pub fn in_outage(&self) -> bool {
        self.outage
    }

    pub fn hits(&self, cell: usize) -> u8 {
        self.hits[cell]
    }

    pub fn recovery_progress(&self) -> u32 {
        self.recovery.count_ones()
    }

    pub fn window_bonus_ms(&self) -> i64 {
        self.window_bonus_ms
    }

    pub fn record(&self, cell: usize, bonus_ms: i64, cap_ms: i64) -> (Self, OveruseStep) {
        let mut next = *self;

        if !self.outage {
            next.hits[cell] = next.hits[cell].saturating_add(1);
            if next.hits[cell] >= OVERUSE_LIMIT {
                next.outage = true;
                next.recovery = 0;
                return (next, OveruseStep::OutageStarted);
            }
            return (next, OveruseStep::Normal);
        }

        let bit = 1u16 << cell;
        if next.recovery & bit != 0 {
            next.recovery = 0;
            return (next, OveruseStep::Blocked { progress: 0 });
        }

        next.recovery |= bit;
        if next.recovery_progress() >= RECOVERY_CELLS {
            next.outage = false;
            next.recovery = 0;
            next.hits = [0; CELLS];
            next.window_bonus_ms = (next.window_bonus_ms + bonus_ms).min(cap_ms.max(0));
            return (next, OveruseStep::Recovered);
        }

        let progress = next.recovery_progress();
        (next, OveruseStep::Blocked { progress })
    }

    pub fn on_miss(&self) -> (Self, bool) {
        if !self.outage {
            return (*self, false);
        }
        let next = Self {
            hits: [0; CELLS],
            outage: false,
            recovery: 0,
            window_bonus_ms: self.window_bonus_ms,
        };
        (next, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overused() -> OveruseTracker {
        let mut tracker = OveruseTracker::default();
        for _ in 0..OVERUSE_LIMIT {
            tracker = tracker.record(0, 50, 850).0;
        }
        tracker
    }

    #[test]
    fn tenth_hit_starts_outage() {
        let mut tracker = OveruseTracker::default();
        for _ in 0..9 {
            let (next, step) = tracker.record(3, 50, 850);
            assert_eq!(step, OveruseStep::Normal);
            tracker = next;
        }
        let (tracker, step) = tracker.record(3, 50, 850);
        assert_eq!(step, OveruseStep::OutageStarted);
        assert!(step.scores());
        assert!(tracker.in_outage());
    }

    #[test]
    fn repeat_resets_recovery_progress() {
        let tracker = overused();
        let (tracker, _) = tracker.record(1, 50, 850);
        let (tracker, _) = tracker.record(2, 50, 850);
        let (tracker, step) = tracker.record(1, 50, 850);
        assert_eq!(step, OveruseStep::Blocked { progress: 0 });
        assert!(tracker.in_outage());
    }

    #[test]
    fn five_distinct_recovers_with_bonus() {
        let mut tracker = overused();
        let mut last = OveruseStep::Normal;
        for cell in [1, 2, 3, 4, 5] {
            let (next, step) = tracker.record(cell, 50, 850);
            tracker = next;
            last = step;
        }
        assert_eq!(last, OveruseStep::Recovered);
        assert!(!tracker.in_outage());
        assert_eq!(tracker.window_bonus_ms(), 50);
        assert_eq!(tracker.hits(0), 0);
    }

    #[test]
    fn bonus_is_capped() {
        let mut tracker = OveruseTracker::default();
        for _ in 0..4 {
            tracker = OveruseTracker {
                window_bonus_ms: tracker.window_bonus_ms,
                ..overused()
            };
            for cell in [1, 2, 3, 4, 5] {
                tracker = tracker.record(cell, 50, 120).0;
            }
        }
        assert_eq!(tracker.window_bonus_ms(), 120);
    }

    #[test]
    fn miss_clears_outage_without_bonus() {
        let (tracker, cleared) = overused().on_miss();
        assert!(cleared);
        assert!(!tracker.in_outage());
        assert_eq!(tracker.window_bonus_ms(), 0);
        assert_eq!(tracker.hits(0), 0);
    }
}
