use serde::{Deserialize, Serialize};

use crate::event::DEFAULT_LOG_CAPACITY;
use crate::settings::MatchSettings;
use crate::swing::{ClassifierConfig, Side};
use crate::timing::TimingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Host,
    Guest,
}

impl Role {
    pub fn side(self) -> Side {
        match self {
            Role::Host => Side::One,
            Role::Guest => Side::Two,
        }
    }

    pub fn is_host(self) -> bool {
        self == Role::Host
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub role: Role,
    pub settings: MatchSettings,
    pub timing: TimingConfig,
    pub classifier: ClassifierConfig,
    pub seed: u64,
    pub log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            role: Role::Host,
            settings: MatchSettings::default(),
            timing: TimingConfig::default(),
            classifier: ClassifierConfig::default(),
            seed: 0,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn host(settings: MatchSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn guest() -> Self {
        Self {
            role: Role::Guest,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
