mod prompt;
mod session;
mod window;

pub use prompt::{ActivePrompt, NextSession, PromptTick, RedirectPrompt};
pub use session::{Phase, Session, SessionState, Snapshot, Transition};
pub use window::{BannerKind, Candidate, NestedList, OneShotBanner, SessionWindow, WindowKind, DEFAULT_LIMIT};
