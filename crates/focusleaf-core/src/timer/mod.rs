mod clock;
mod engine;
mod kind;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::{SessionTimer, TimerPhase, TimerSnapshot};
pub use kind::{SessionDurations, SessionKind};
