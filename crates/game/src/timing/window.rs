use serde::{Deserialize, Serialize};

use super::config::TimingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgement {
    Hit,
    MissEarly,
    MissLate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowParams {
    pub base_window_ms: i64,
    pub mode_shrink_ms: i64,
    pub shot_shrink_pct: i32,
    pub bonus_ms: i64,
    pub serve_return: bool,
}

pub fn hit_window_ms(config: &TimingConfig, params: &WindowParams) -> i64 {
    let base = params.base_window_ms.max(0) as f64;

    let (rally_shrink, shot_shrink) = if params.serve_return || base <= 0.0 {
        (0.0, 0.0)
    } else {
        (
            (params.mode_shrink_ms as f64 / base).clamp(0.0, 1.0),
            (params.shot_shrink_pct as f64 / 100.0).clamp(0.0, 1.0),
        )
    };

    let shrunk = base * (1.0 - rally_shrink) * (1.0 - shot_shrink);
    let with_bonus = (shrunk + params.bonus_ms.max(0) as f64).min(base);

    (with_bonus.round() as i64).max(config.min_window_ms)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitWindow {
    pub arrival_ms: i64,
    pub start_ms: i64,
    pub end_ms: i64,
}

impl HitWindow {
    pub fn position(config: &TimingConfig, hit_ms: i64, arrival_ms: i64, window_ms: i64) -> Self {
        let earliest = hit_ms + config.min_reaction_ms;
        let start_ms = (arrival_ms - config.bounce_offset_ms).max(earliest);
        Self {
            arrival_ms,
            start_ms,
            end_ms: start_ms + window_ms,
        }
    }

    pub fn len_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    pub fn judge(&self, swing_ms: i64) -> Judgement {
        if swing_ms < self.start_ms {
            Judgement::MissEarly
        } else if swing_ms > self.end_ms {
            Judgement::MissLate
        } else {
            Judgement::Hit
        }
    }

    pub fn delta_ms(&self, swing_ms: i64) -> i64 {
        swing_ms - self.arrival_ms
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn serve_return_gets_full_window() {
        let config = TimingConfig::default();
        let params = WindowParams {
            base_window_ms: 850,
            mode_shrink_ms: 300,
            shot_shrink_pct: 20,
            bonus_ms: 0,
            serve_return: true,
        };
        assert_eq!(hit_window_ms(&config, &params), 850);
    }

    #[test]
    fn shrink_compounds() {
        let config = TimingConfig::default();
        let params = WindowParams {
            base_window_ms: 1000,
            mode_shrink_ms: 100,
            shot_shrink_pct: 10,
            bonus_ms: 0,
            serve_return: false,
        };
        assert_eq!(hit_window_ms(&config, &params), 810);
    }

    #[test]
    fn bonus_never_exceeds_base() {
        let config = TimingConfig::default();
        let params = WindowParams {
            base_window_ms: 850,
            mode_shrink_ms: 20,
            shot_shrink_pct: 0,
            bonus_ms: 150,
            serve_return: false,
        };
        assert_eq!(hit_window_ms(&config, &params), 850);
    }

    #[test]
    fn window_clamped_after_reaction_floor() {
        let config = TimingConfig::default();
        let window = HitWindow::position(&config, 1_000, 1_200, 400);
        assert_eq!(window.start_ms, 1_300);
        assert_eq!(window.end_ms, 1_700);

        let window = HitWindow::position(&config, 1_000, 2_000, 400);
        assert_eq!(window.start_ms, 1_850);
    }

    #[test]
    fn judging() {
        let config = TimingConfig::default();
        let window = HitWindow::position(&config, 0, 1_000, 400);
        assert_eq!(window.judge(849), Judgement::MissEarly);
        assert_eq!(window.judge(850), Judgement::Hit);
        assert_eq!(window.judge(1_250), Judgement::Hit);
        assert_eq!(window.judge(1_251), Judgement::MissLate);
        assert_eq!(window.delta_ms(1_100), 100);
    }

    proptest! {
        #[test]
        fn window_never_below_floor(
            rally in 0i64..400,
            shot_pct in 0i32..100,
            difficulty_window in prop::sample::select(vec![1100i64, 850, 650, 500]),
            tier in 0i64..8,
        ) {
            let config = TimingConfig::default();
            for mode_shrink in [10 * (rally - 1).max(0), 50 * tier] {
                let params = WindowParams {
                    base_window_ms: difficulty_window,
                    mode_shrink_ms: mode_shrink,
                    shot_shrink_pct: shot_pct,
                    bonus_ms: 0,
                    serve_return: false,
                };
                prop_assert!(hit_window_ms(&config, &params) >= config.min_window_ms);
            }
        }
    }
}
