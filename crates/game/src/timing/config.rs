use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub min_window_ms: i64,
    pub bounce_offset_ms: i64,
    pub min_reaction_ms: i64,
    pub auto_miss_buffer_ms: i64,
    pub debounce_ms: i64,
    pub point_pause_ms: i64,
    pub overuse_bonus_ms: i64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_window_ms: 250,
            bounce_offset_ms: 150,
            min_reaction_ms: 300,
            auto_miss_buffer_ms: 200,
            debounce_ms: 300,
            point_pause_ms: 1500,
            overuse_bonus_ms: 50,
        }
    }
}
