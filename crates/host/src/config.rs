use rally::{LinkSimulation, MatchSettings};

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub settings: MatchSettings,
    pub link: LinkSimulation,
    pub tick_ms: u64,
    pub speed: u32,
    pub accuracy: f64,
    pub serve_delay_ms: i64,
    pub max_match_ms: i64,
    pub seed: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            settings: MatchSettings::default(),
            link: LinkSimulation::fixed(40),
            tick_ms: 5,
            speed: 8,
            accuracy: 0.85,
            serve_delay_ms: 600,
            max_match_ms: 30 * 60 * 1000,
            seed: 0,
        }
    }
}
