mod config;
mod flight;
mod result;
mod risk;
mod window;

pub use config::TimingConfig;
pub use flight::{arrival_ms, flight_modifier, flight_time_ms};
pub use result::HitResult;
pub use risk::{roll_fault, Fault};
pub use window::{hit_window_ms, HitWindow, Judgement, WindowParams};
