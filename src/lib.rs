// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod notification;
pub mod runtime;
pub mod scores;
pub mod store;
pub mod symbols;
pub mod tier;
pub mod timer;
pub mod ui;

pub use engine::{GameEngine, KeyOutcome, Phase, RoundState};
pub use error::{Error, Result};
pub use tier::DifficultyTier;
