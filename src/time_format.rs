use snafu::{OptionExt, ResultExt, Snafu};

/// Converts a clock time like `19:00` to the number of minutes since midnight.
pub fn time_to_minutes(time: &str) -> Result<i32, TimeFormatError> {
    let (hours, minutes) = time.trim().split_once(':').context(MissingSeparatorSnafu { time })?;
    let hours: i32 = hours.parse().context(InvalidNumberSnafu { time })?;
    let minutes: i32 = minutes.parse().context(InvalidNumberSnafu { time })?;

    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return OutOfRangeSnafu { time }.fail();
    }

    Ok(hours * 60 + minutes)
}

/// Renders a minute offset as `HH:MM`.
///
/// Hours wrap around at 24 unless `multiple_days` is set. Negative offsets
/// keep their sign when `allow_negatives` is set and clamp to `00:00` otherwise.
pub fn minutes_to_time(minutes: i64, multiple_days: bool, allow_negatives: bool) -> String {
    if minutes < 0 && !allow_negatives {
        return "00:00".to_string();
    }

    let negative = minutes < 0;
    let minutes = minutes.abs();
    let mut hours = minutes / 60;
    if !multiple_days {
        hours %= 24;
    }

    format!("{}{:02}:{:02}", if negative { "-" } else { "" }, hours, minutes % 60)
}

/// Renders a minute offset as kiosk text, e.g. `2 u 5 m`.
pub fn minutes_to_time_text(minutes: i64, always_show_minutes: bool) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    let (hours, rest) = (minutes / 60, minutes % 60);

    if always_show_minutes || rest > 0 {
        format!("{sign}{hours} u {rest} m")
    } else {
        format!("{sign}{hours} u")
    }
}

/// Renders a duration in seconds as `HH:MM:SS`. Hours are not wrapped.
pub fn seconds_to_time(seconds: u64) -> String {
    format!("{:02}:{:02}:{:02}", seconds / 3600, (seconds / 60) % 60, seconds % 60)
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum TimeFormatError {
    #[snafu(display("Time '{time}' is missing the ':' separator"))]
    MissingSeparator { time: String },

    #[snafu(display("Time '{time}' contains an invalid number"))]
    InvalidNumber { time: String, source: std::num::ParseIntError },

    #[snafu(display("Time '{time}' is not a valid time of day"))]
    OutOfRange { time: String },
}
