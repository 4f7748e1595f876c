mod history;
mod types;

pub use history::{EventLog, LoggedEvent, DEFAULT_LOG_CAPACITY};
pub use types::MatchEvent;
