//! Presentation layer: client-side turn state and console rendering

pub mod output;
pub mod state;

pub use output::console::ConsoleFormatter;
pub use state::reducer::{SessionState, TurnState};
