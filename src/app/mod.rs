mod action;
mod controller;
mod handler;
mod report;
mod runtime;
mod state;
mod timers;

pub use action::Action;
pub use controller::PageController;
pub use runtime::{run_headless, run_once, run_tui};
pub use state::AppState;
