pub mod banner;
pub mod prompt_overlay;
pub mod session_list;
pub mod status_bar;
pub mod windows_pane;
