use std::{fmt::Formatter, str::FromStr};

use serde::de::{self, Visitor};
use serde::Deserialize;
use snafu::{OptionExt, ResultExt, Snafu};

use crate::time_format::{self, TimeFormatError};

/// An unpadded clock-time range such as `19:00-22:00`, as written in the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_minutes: i32,
    pub end_minutes: i32,
}

/// A window in minutes since midnight with the buffer already applied on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteRange {
    pub start_minutes: i32,
    pub end_minutes: i32,
}

impl TimeWindow {
    pub fn padded(&self, buffer_minutes: i32) -> MinuteRange {
        MinuteRange {
            start_minutes: self.start_minutes - buffer_minutes,
            end_minutes: self.end_minutes + buffer_minutes,
        }
    }
}

impl MinuteRange {
    /// Bounds are inclusive.
    pub fn contains(&self, minutes: i32) -> bool {
        minutes >= self.start_minutes && minutes <= self.end_minutes
    }
}

impl FromStr for TimeWindow {
    type Err = WindowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (start, end) = value.split_once('-').context(MissingDashSnafu { value })?;
        let start_minutes = time_format::time_to_minutes(start).context(InvalidBoundSnafu { value })?;
        let end_minutes = time_format::time_to_minutes(end).context(InvalidBoundSnafu { value })?;

        if end_minutes < start_minutes {
            return ReversedSnafu { value }.fail();
        }

        Ok(TimeWindow { start_minutes, end_minutes })
    }
}

impl<'de> Deserialize<'de> for TimeWindow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: serde::Deserializer<'de> {
        struct TimeWindowVisitor;

        impl<'de> Visitor<'de> for TimeWindowVisitor {
            type Value = TimeWindow;

            fn expecting(&self, formatter: &mut Formatter) -> Result<(), std::fmt::Error> {
                formatter.write_str("a time window like '19:00-22:00'")
            }

            fn visit_str<E>(self, value: &str) -> Result<TimeWindow, E>
            where
                E: de::Error,
            {
                TimeWindow::from_str(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimeWindowVisitor)
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum WindowError {
    #[snafu(display("Invalid time window '{value}', expected 'HH:MM-HH:MM'"))]
    MissingDash { value: String },

    #[snafu(display("Invalid time window '{value}': {source}"))]
    InvalidBound { value: String, source: TimeFormatError },

    #[snafu(display("Time window '{value}' ends before it starts"))]
    Reversed { value: String },
}
