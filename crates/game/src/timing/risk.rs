use rand::Rng;

use crate::settings::ShotTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Net,
    Out,
}

pub fn roll_fault<R: Rng>(tuning: ShotTuning, rng: &mut R) -> Option<Fault> {
    if roll(tuning.net_fault_pct, rng) {
        return Some(Fault::Net);
    }
    if roll(tuning.out_fault_pct, rng) {
        return Some(Fault::Out);
    }
    None
}

fn roll<R: Rng>(pct: i32, rng: &mut R) -> bool {
    if pct <= 0 {
        return false;
    }
    rng.gen_range(0.0..100.0) < pct as f64
}
