mod classifier;
mod types;

pub use classifier::{ClassifierConfig, Handedness, SwingClassifier, HARD_OFFSET, MEDIUM_OFFSET};
pub use types::{Intensity, ShotType, Side, SpinType, SwingEvent, Trajectory};
