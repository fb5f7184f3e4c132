use std::collections::HashMap;
use std::time::Duration;

use serde_derive::Deserialize;

use crate::access::window::TimeWindow;

use super::schedule::TimeSchedule;

// When changing anything here, make sure to add
// #[serde(alias = "ihavenounderscores")]
// where needed, so it can be read from the ENV vars.

#[derive(Debug, Deserialize)]
pub struct Channel {
    pub uri: String,
    #[serde(alias = "clientid")]
    pub client_id: String,
    #[serde(alias = "roottopic")]
    pub root_topic: String,
    pub username: String,
    pub password: String,
    #[serde(alias = "keepalive", with = "humantime_serde")]
    pub keep_alive: Duration,
    #[serde(alias = "failurewait", with = "humantime_serde")]
    pub failure_wait: Duration,
}

#[derive(Debug, Deserialize)]
pub struct Access {
    /// Added before the start and after the end of every window.
    #[serde(with = "humantime_serde")]
    pub buffer: Duration,
    #[serde(alias = "forcefreewindow")]
    pub force_free_window: bool,
    #[serde(alias = "allowpaidunlock")]
    pub allow_paid_unlock: bool,
    /// Weekday name (`fri`, `saturday`, ...) to window.
    #[serde(default = "default_windows")]
    pub windows: HashMap<String, TimeWindow>,
}

#[derive(Debug, Deserialize)]
pub struct Input {
    #[serde(alias = "debouncetime", with = "humantime_serde")]
    pub debounce_time: Duration,
}

#[derive(Debug, Deserialize)]
pub struct Board {
    pub refresh: TimeSchedule,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub channel: Channel,
    pub access: Access,
    pub input: Input,
    pub board: Board,
    #[serde(alias = "sentrydsn")]
    pub sentry_dsn: Option<String>,
}

fn default_windows() -> HashMap<String, TimeWindow> {
    HashMap::from([
        ("fri".to_string(), TimeWindow { start_minutes: 19 * 60, end_minutes: 22 * 60 }),
        ("sat".to_string(), TimeWindow { start_minutes: 9 * 60 + 30, end_minutes: 13 * 60 + 30 }),
    ])
}
