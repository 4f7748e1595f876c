use serde::{Deserialize, Serialize};

use super::risk::Fault;
use super::window::Judgement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitResult {
    Hit,
    MissEarly,
    MissLate,
    NetFault,
    OutFault,
    PenaltyEnd,
}

impl HitResult {
    pub fn code(self) -> u8 {
        match self {
            HitResult::Hit => 0,
            HitResult::MissEarly => 1,
            HitResult::MissLate => 2,
            HitResult::NetFault => 3,
            HitResult::OutFault => 4,
            HitResult::PenaltyEnd => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(HitResult::Hit),
            1 => Some(HitResult::MissEarly),
            2 => Some(HitResult::MissLate),
            3 => Some(HitResult::NetFault),
            4 => Some(HitResult::OutFault),
            5 => Some(HitResult::PenaltyEnd),
            _ => None,
        }
    }

    pub fn is_miss(self) -> bool {
        self != HitResult::Hit
    }
}

impl From<Judgement> for HitResult {
    fn from(judgement: Judgement) -> Self {
        match judgement {
            Judgement::Hit => HitResult::Hit,
            Judgement::MissEarly => HitResult::MissEarly,
            Judgement::MissLate => HitResult::MissLate,
        }
    }
}

impl From<Fault> for HitResult {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Net => HitResult::NetFault,
            Fault::Out => HitResult::OutFault,
        }
    }
}
