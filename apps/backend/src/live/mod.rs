//! Timed automated actions and post-transition publication.

mod orchestrator;

pub use orchestrator::LiveOrchestrator;
