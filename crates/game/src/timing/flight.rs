use crate::swing::{Intensity, ShotType, Trajectory};

pub fn flight_modifier(shot: ShotType, is_serve: bool) -> f64 {
    if is_serve {
        serve_modifier(shot)
    } else {
        rally_modifier(shot)
    }
}

fn rally_modifier(shot: ShotType) -> f64 {
    let force = match shot.intensity {
        Intensity::Soft => 1.15,
        Intensity::Medium => 1.0,
        Intensity::Hard => 0.85,
    };
    let shape = match shot.trajectory {
        Trajectory::Flat => 1.0,
        Trajectory::Lob => 1.2,
        Trajectory::Smash => 0.8,
    };
    force * shape
}

// Serves always travel on an arc: smashes and lobs are not allowed to speed
// the ball up past a flat rally stroke.
fn serve_modifier(shot: ShotType) -> f64 {
    let force = match shot.intensity {
        Intensity::Soft => 1.3,
        Intensity::Medium => 1.2,
        Intensity::Hard => 1.1,
    };
    let shape = match shot.trajectory {
        Trajectory::Flat => 1.0,
        Trajectory::Lob => 1.1,
        Trajectory::Smash => 0.95,
    };
    force * shape
}

pub fn flight_time_ms(base_flight_ms: i64, shot: ShotType, is_serve: bool) -> i64 {
    (base_flight_ms as f64 * flight_modifier(shot, is_serve)).round() as i64
}

pub fn arrival_ms(hit_ms: i64, base_flight_ms: i64, shot: ShotType, is_serve: bool) -> i64 {
    hit_ms + flight_time_ms(base_flight_ms, shot, is_serve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_are_never_faster_than_flat_rally() {
        for shot in ShotType::all() {
            assert!(flight_modifier(shot, true) >= 1.0, "{shot}");
        }
    }

    #[test]
    fn arrival_scales_base_flight() {
        let shot = ShotType::new(Intensity::Medium, Trajectory::Flat);
        assert_eq!(arrival_ms(5_000, 1000, shot, false), 6_000);
        assert_eq!(arrival_ms(5_000, 1000, shot, true), 6_200);

        let smash = ShotType::new(Intensity::Hard, Trajectory::Smash);
        assert_eq!(arrival_ms(0, 1000, smash, false), 680);
    }
}
