mod orchestrator;

pub use orchestrator::{SessionIndicator, SessionOrchestrator};
