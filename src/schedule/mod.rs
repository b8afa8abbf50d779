//! Session phase engine: polling, projection onto the page, containers,
//! the next-session prompt and the post-session banners.

mod banners;
mod clock;
mod notifier;
mod projector;
mod windows;

pub use banners::{BannerEvent, BannerWatcher};
pub use clock::SessionClock;
pub use notifier::{Notice, TransitionNotifier};
pub use projector::VisibilityProjector;
pub use windows::{WindowReport, WindowUpdater};
