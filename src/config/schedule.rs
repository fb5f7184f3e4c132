use std::{str::FromStr, time::Duration};

use chrono::{DateTime, OutOfRangeError, TimeZone};
use croner::{errors::CronError, Cron};
use serde::{de, Deserialize};
use snafu::{ResultExt, Snafu};

/// When the board re-evaluates the access window and redraws.
#[derive(Debug)]
pub enum TimeSchedule {
    Interval(Duration),
    Cron(Cron),
}

impl TimeSchedule {
    pub fn duration_till_next_occurrence<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Duration, ScheduleError> {
        match self {
            TimeSchedule::Cron(cron) => {
                let next_occurrence = cron.find_next_occurrence(now, false).context(NextOccurrenceSnafu)?;
                (next_occurrence - now.clone()).to_std().context(OutOfRangeSnafu)
            },
            TimeSchedule::Interval(duration) => Ok(*duration),
        }
    }
}

impl FromStr for TimeSchedule {
    type Err = ScheduleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // '30s' would also be tried as a cron pattern otherwise.
        if let Ok(duration) = humantime::parse_duration(value) {
            return Ok(TimeSchedule::Interval(duration));
        }

        match Cron::new(value).parse() {
            Ok(cron) => Ok(TimeSchedule::Cron(cron)),
            Err(_) => InvalidScheduleSnafu { value }.fail(),
        }
    }
}

impl<'de> Deserialize<'de> for TimeSchedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: serde::Deserializer<'de> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Snafu)]
pub enum ScheduleError {
    #[snafu(display("'{value}' is neither a duration nor a cron expression"))]
    InvalidSchedule { value: String },
    #[snafu(display("Could not resolve the next cron occurrence"))]
    NextOccurrence { source: CronError },
    #[snafu(display("Next occurrence lies in the past"))]
    OutOfRange { source: OutOfRangeError },
}
