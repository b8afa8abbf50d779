pub mod countdown;
pub mod display;
pub mod parser;
pub mod shift;
pub mod wall;
pub mod zone;

pub use countdown::{coarse_text, fine_text, start_countdown_text, Breakdown};
pub use display::TimeCopy;
pub use parser::{TimeParser, DEFAULT_SOURCE_OFFSET_MINUTES};
pub use shift::{minutes_or, seconds_or, shift_minutes, shift_seconds};
pub use wall::{ShiftedClock, SystemClock, WallClock};
pub use zone::{abbreviation_for, ViewerZone};
