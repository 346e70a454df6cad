use chrono::{Local, Timelike};

/// First hour (inclusive) that counts as daytime.
pub const DAY_START_HOUR: u32 = 7;
/// First hour (inclusive) that counts as night again.
pub const NIGHT_START_HOUR: u32 = 19;

/// Which background image the window shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Background {
    Day,
    Night,
}

impl Background {
    pub fn file_name(&self) -> &'static str {
        match self {
            Background::Day => "daytime.png",
            Background::Night => "night.png",
        }
    }
}

impl std::fmt::Display for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Background::Day => f.write_str("day"),
            Background::Night => f.write_str("night"),
        }
    }
}

pub fn background_for(hour: u32) -> Background {
    if (DAY_START_HOUR..NIGHT_START_HOUR).contains(&hour) {
        Background::Day
    } else {
        Background::Night
    }
}

/// Hour of the machine's local wall clock.
///
/// This is not the hour at the queried place: no timezone lookup is done.
pub fn current_hour() -> u32 {
    Local::now().hour()
}
