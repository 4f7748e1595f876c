use serde::{Deserialize, Serialize};

use crate::swing::ShotType;

pub const DEFAULT_FLIGHT_TIME_MS: i64 = 1000;
pub const DEFAULT_DIFFICULTY: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Competitive,
    Cooperative,
    Solo,
}

impl GameMode {
    pub fn code(self) -> u8 {
        match self {
            GameMode::Competitive => 0,
            GameMode::Cooperative => 1,
            GameMode::Solo => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(GameMode::Competitive),
            1 => Some(GameMode::Cooperative),
            2 => Some(GameMode::Solo),
            _ => None,
        }
    }

    pub fn is_rally(self) -> bool {
        !matches!(self, GameMode::Competitive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotTuning {
    pub net_fault_pct: i32,
    pub out_fault_pct: i32,
    pub shrink_pct: i32,
}

impl ShotTuning {
    pub const WIRE_FIELDS: usize = 3;

    pub const fn new(net_fault_pct: i32, out_fault_pct: i32, shrink_pct: i32) -> Self {
        Self {
            net_fault_pct,
            out_fault_pct,
            shrink_pct,
        }
    }
}

// Indexed by shot code: Soft{Flat,Lob,Smash}, Medium{..}, Hard{..}.
const DEFAULT_TUNING: [ShotTuning; ShotType::COUNT] = [
    ShotTuning::new(0, 0, 0),
    ShotTuning::new(0, 0, 0),
    ShotTuning::new(0, 1, 0),
    ShotTuning::new(1, 1, 5),
    ShotTuning::new(1, 2, 5),
    ShotTuning::new(2, 3, 10),
    ShotTuning::new(3, 4, 10),
    ShotTuning::new(3, 5, 10),
    ShotTuning::new(5, 6, 20),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingTuning {
    shots: [ShotTuning; ShotType::COUNT],
}

impl Default for SwingTuning {
    fn default() -> Self {
        Self {
            shots: DEFAULT_TUNING,
        }
    }
}

impl SwingTuning {
    pub fn get(&self, shot: ShotType) -> ShotTuning {
        self.shots[shot.index()]
    }

    pub fn set(&mut self, shot: ShotType, tuning: ShotTuning) {
        self.shots[shot.index()] = tuning;
    }

    pub fn without_risk(&self) -> Self {
        let mut tuning = self.clone();
        for shot in &mut tuning.shots {
            shot.net_fault_pct = 0;
            shot.out_fault_pct = 0;
        }
        tuning
    }

    pub fn to_wire(&self) -> Vec<i32> {
        self.shots
            .iter()
            .flat_map(|s| [s.net_fault_pct, s.out_fault_pct, s.shrink_pct])
            .collect()
    }

    // Missing trailing entries keep their defaults; extra entries are ignored.
    // Values are kept as sent and bounded where they are used.
    pub fn from_wire(values: &[i32]) -> Self {
        let mut tuning = Self::default();
        for (shot, chunk) in tuning
            .shots
            .iter_mut()
            .zip(values.chunks(ShotTuning::WIRE_FIELDS))
        {
            if let Some(&v) = chunk.first() {
                shot.net_fault_pct = v;
            }
            if let Some(&v) = chunk.get(1) {
                shot.out_fault_pct = v;
            }
            if let Some(&v) = chunk.get(2) {
                shot.shrink_pct = v;
            }
        }
        tuning
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusToggles {
    pub spin: bool,
    pub copy: bool,
    pub grid_effects: bool,
    pub overuse: bool,
}

impl BonusToggles {
    pub const ALL: Self = Self {
        spin: true,
        copy: true,
        grid_effects: true,
        overuse: true,
    };

    pub const NONE: Self = Self {
        spin: false,
        copy: false,
        grid_effects: false,
        overuse: false,
    };
}

impl Default for BonusToggles {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub flight_time_ms: i64,
    pub difficulty: i32,
    pub tuning: SwingTuning,
    pub rally_shrink_enabled: bool,
    pub game_mode: GameMode,
    pub bonuses: BonusToggles,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            flight_time_ms: DEFAULT_FLIGHT_TIME_MS,
            difficulty: DEFAULT_DIFFICULTY,
            tuning: SwingTuning::default(),
            rally_shrink_enabled: true,
            game_mode: GameMode::Competitive,
            bonuses: BonusToggles::default(),
        }
    }
}

impl MatchSettings {
    pub fn for_mode(game_mode: GameMode) -> Self {
        Self {
            game_mode,
            ..Default::default()
        }
    }

    pub fn base_window_ms(&self) -> i64 {
        match self.difficulty.max(0) {
            0 => 1100,
            1 => 850,
            2 => 650,
            _ => 500,
        }
    }

    // Risk only exists in competitive play; rally modes zero the fault table.
    pub fn effective_tuning(&self) -> SwingTuning {
        if self.game_mode.is_rally() {
            self.tuning.without_risk()
        } else {
            self.tuning.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swing::{Intensity, Trajectory};

    #[test]
    fn tuning_wire_fills_missing_from_defaults() {
        let tuning = SwingTuning::from_wire(&[50, 40, 30]);
        let first = tuning.get(ShotType::from_code(0).unwrap());
        assert_eq!(first, ShotTuning::new(50, 40, 30));

        let hard_smash = ShotType::new(Intensity::Hard, Trajectory::Smash);
        assert_eq!(tuning.get(hard_smash), DEFAULT_TUNING[8]);
    }

    #[test]
    fn tuning_wire_roundtrip() {
        let mut tuning = SwingTuning::default();
        tuning.set(
            ShotType::new(Intensity::Medium, Trajectory::Lob),
            ShotTuning::new(7, 8, 9),
        );
        let wire = tuning.to_wire();
        assert_eq!(wire.len(), 27);
        assert_eq!(SwingTuning::from_wire(&wire), tuning);
    }

    #[test]
    fn tuning_wire_keeps_out_of_range_values() {
        let tuning = SwingTuning::from_wire(&[-1, 250, i32::MAX]);
        let first = tuning.get(ShotType::from_code(0).unwrap());
        assert_eq!(first, ShotTuning::new(-1, 250, i32::MAX));
        assert_eq!(SwingTuning::from_wire(&tuning.to_wire()), tuning);
    }

    #[test]
    fn rally_modes_have_no_risk() {
        let settings = MatchSettings::for_mode(GameMode::Cooperative);
        let tuning = settings.effective_tuning();
        assert!(ShotType::all().all(|s| {
            let t = tuning.get(s);
            t.net_fault_pct == 0 && t.out_fault_pct == 0
        }));
    }

    #[test]
    fn difficulty_maps_to_window() {
        let mut settings = MatchSettings::default();
        settings.difficulty = -4;
        assert_eq!(settings.base_window_ms(), 1100);
        settings.difficulty = 9;
        assert_eq!(settings.base_window_ms(), 500);
    }
}
