mod keybindings;
mod page;
mod settings;

pub use keybindings::{BoardCommand, Keymap};
pub use page::{FeedbackConfig, PageConfig, RedirectConfig, StartCountdownConfig};
pub use settings::Settings;
