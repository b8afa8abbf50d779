#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Scheduled work
    Poll,
    CountdownTick,
    OverlayCheck,
    PromptTick,
    LoadSettled,

    // Prompt controls
    CancelPrompt,
    FollowLink,
    Navigate(String),

    // Page lifecycle
    Refresh,
    VisibilityChanged(bool), // true when the page becomes visible again

    // App control
    Quit,
    Tick,
    Resize(u16, u16),
}
