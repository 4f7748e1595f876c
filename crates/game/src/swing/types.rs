use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::One, Side::Two];

    pub fn other(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Side::One),
            1 => Some(Side::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::One => write!(f, "P1"),
            Side::Two => write!(f, "P2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Intensity {
    Soft,
    Medium,
    Hard,
}

impl Intensity {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trajectory {
    Flat,
    Lob,
    Smash,
}

impl Trajectory {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShotType {
    pub intensity: Intensity,
    pub trajectory: Trajectory,
}

impl ShotType {
    pub const COUNT: usize = 9;

    pub const fn new(intensity: Intensity, trajectory: Trajectory) -> Self {
        Self {
            intensity,
            trajectory,
        }
    }

    pub fn all() -> impl Iterator<Item = ShotType> {
        (0..Self::COUNT as i32).filter_map(Self::from_code)
    }

    pub fn code(self) -> i32 {
        (self.intensity.index() * 3 + self.trajectory.index()) as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        if !(0..Self::COUNT as i32).contains(&code) {
            return None;
        }
        let intensity = match code / 3 {
            0 => Intensity::Soft,
            1 => Intensity::Medium,
            _ => Intensity::Hard,
        };
        let trajectory = match code % 3 {
            0 => Trajectory::Flat,
            1 => Trajectory::Lob,
            _ => Trajectory::Smash,
        };
        Some(Self::new(intensity, trajectory))
    }

    pub fn index(self) -> usize {
        self.code() as usize
    }
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.intensity, self.trajectory)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpinType {
    #[default]
    None,
    Top,
    Back,
    Left,
    Right,
    TopLeft,
    TopRight,
    BackLeft,
    BackRight,
}

impl SpinType {
    const ORDER: [SpinType; 9] = [
        SpinType::None,
        SpinType::Top,
        SpinType::Back,
        SpinType::Left,
        SpinType::Right,
        SpinType::TopLeft,
        SpinType::TopRight,
        SpinType::BackLeft,
        SpinType::BackRight,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ORDER.get(i).copied())
    }

    pub fn is_spinning(self) -> bool {
        self != SpinType::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SwingEvent {
    pub timestamp_ms: i64,
    pub force: f32,
    pub accel: [f32; 3],
    pub gyro: [f32; 3],
    pub gravity: [f32; 3],
}

impl SwingEvent {
    pub fn new(timestamp_ms: i64, force: f32) -> Self {
        Self {
            timestamp_ms,
            force,
            ..Default::default()
        }
    }

    pub fn with_tilt(mut self, tilt: f32) -> Self {
        self.gravity[2] = tilt;
        self
    }

    pub fn with_gyro(mut self, gyro_y: f32, gyro_z: f32) -> Self {
        self.gyro[1] = gyro_y;
        self.gyro[2] = gyro_z;
        self
    }

    pub fn tilt(&self) -> f32 {
        self.gravity[2]
    }

    pub fn gyro_y(&self) -> f32 {
        self.gyro[1]
    }

    pub fn gyro_z(&self) -> f32 {
        self.gyro[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_codes_cover_all_nine() {
        let codes: Vec<i32> = ShotType::all().map(ShotType::code).collect();
        assert_eq!(codes, (0..9).collect::<Vec<_>>());
        assert!(ShotType::from_code(9).is_none());
        assert!(ShotType::from_code(-1).is_none());
    }

    #[test]
    fn spin_codes() {
        assert_eq!(SpinType::from_code(0), Some(SpinType::None));
        assert_eq!(SpinType::from_code(8), Some(SpinType::BackRight));
        assert_eq!(SpinType::BackLeft.code(), 7);
        assert!(SpinType::from_code(9).is_none());
    }
}
