//! Orchestrator HTTP service.

pub mod api;
pub mod background;
pub mod router;
pub mod startup;
pub mod state;

pub use router::build_router;
pub use startup::{run, serve};
pub use state::AppState;
