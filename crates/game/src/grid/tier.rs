use crate::swing::ShotType;

// Tier levels are packed three bits per cell on the wire.
pub const MAX_TIER: u8 = 7;

pub fn triangular(n: u32) -> u32 {
    n * (n + 1) / 2
}

pub fn cell_points(tier: u8) -> u32 {
    triangular(tier as u32 + 1)
}

pub fn cell_for_shot(shot: ShotType) -> usize {
    shot.intensity.index() * 3 + shot.trajectory.index()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swing::{Intensity, Trajectory};

    #[test]
    fn triangular_sequence() {
        let values: Vec<u32> = (0..6).map(triangular).collect();
        assert_eq!(values, vec![0, 1, 3, 6, 10, 15]);
        assert_eq!(cell_points(0), 1);
        assert_eq!(cell_points(2), 6);
    }

    #[test]
    fn cell_mapping_is_total_and_distinct() {
        let mut seen = [false; 9];
        for shot in ShotType::all() {
            let cell = cell_for_shot(shot);
            assert!(!seen[cell]);
            seen[cell] = true;
        }
        assert_eq!(
            cell_for_shot(ShotType::new(Intensity::Medium, Trajectory::Lob)),
            4
        );
    }
}
