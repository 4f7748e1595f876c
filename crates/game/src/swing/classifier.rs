use serde::{Deserialize, Serialize};

use super::types::{Intensity, ShotType, SpinType, SwingEvent, Trajectory};

pub const MEDIUM_OFFSET: f32 = 9.0;
pub const HARD_OFFSET: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub base_threshold: f32,
    pub tilt_cutoff: f32,
    pub topspin_threshold: f32,
    pub sidespin_threshold: f32,
    pub handedness: Handedness,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_threshold: 14.0,
            tilt_cutoff: 4.0,
            topspin_threshold: 6.0,
            sidespin_threshold: 5.0,
            handedness: Handedness::Right,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SwingClassifier {
    config: ClassifierConfig,
}

impl SwingClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, event: &SwingEvent) -> (ShotType, SpinType) {
        let shot = ShotType::new(self.intensity(event.force), self.trajectory(event.tilt()));
        let spin = self.spin(event.gyro_y(), event.gyro_z());
        (shot, spin)
    }

    // Exactly-at-threshold readings belong to the lower band.
    pub fn intensity(&self, force: f32) -> Intensity {
        let t = self.config.base_threshold;
        if force <= t + MEDIUM_OFFSET {
            Intensity::Soft
        } else if force <= t + HARD_OFFSET {
            Intensity::Medium
        } else {
            Intensity::Hard
        }
    }

    pub fn trajectory(&self, tilt: f32) -> Trajectory {
        let cutoff = self.config.tilt_cutoff;
        if tilt > cutoff {
            Trajectory::Lob
        } else if tilt < -cutoff {
            Trajectory::Smash
        } else {
            Trajectory::Flat
        }
    }

    pub fn spin(&self, gyro_y: f32, gyro_z: f32) -> SpinType {
        let gyro_y = match self.config.handedness {
            Handedness::Right => gyro_y,
            Handedness::Left => -gyro_y,
        };

        let vertical = if gyro_y.abs() > self.config.topspin_threshold {
            Some(gyro_y > 0.0)
        } else {
            None
        };
        let lateral = if gyro_z.abs() > self.config.sidespin_threshold {
            Some(gyro_z > 0.0)
        } else {
            None
        };

        match (vertical, lateral) {
            (None, None) => SpinType::None,
            (Some(true), None) => SpinType::Top,
            (Some(false), None) => SpinType::Back,
            (None, Some(false)) => SpinType::Left,
            (None, Some(true)) => SpinType::Right,
            (Some(true), Some(false)) => SpinType::TopLeft,
            (Some(true), Some(true)) => SpinType::TopRight,
            (Some(false), Some(false)) => SpinType::BackLeft,
            (Some(false), Some(true)) => SpinType::BackRight,
        }
    }
}
