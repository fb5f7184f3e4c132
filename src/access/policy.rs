use std::collections::HashMap;

use chrono::{Datelike, Timelike, Weekday};
use log::warn;

use crate::config::models::Access;
use crate::fleet::models::Printer;

use super::window::MinuteRange;

/// Which unlock path an unpaid printer offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockHint {
    /// Staffed hours: the job can be released without paying.
    FreeUnlock,
    /// Outside staffed hours: the job has to be paid for.
    PaymentRequired,
}

/// Decides when unlocking printers is free.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    windows: HashMap<Weekday, MinuteRange>,
    force_free_window: bool,
    allow_paid_unlock: bool,
}

impl AccessPolicy {
    pub fn new(windows: HashMap<Weekday, MinuteRange>, force_free_window: bool, allow_paid_unlock: bool) -> Self {
        Self { windows, force_free_window, allow_paid_unlock }
    }

    /// Builds the policy from the access settings, padding every window with the configured buffer.
    /// Entries whose key is not a weekday are skipped.
    pub fn from_settings(access: &Access) -> Self {
        let buffer_minutes = (access.buffer.as_secs() / 60) as i32;
        let windows = access.windows.iter()
            .filter_map(|(day, window)| match day.parse::<Weekday>() {
                Ok(weekday) => Some((weekday, window.padded(buffer_minutes))),
                Err(_) => {
                    warn!("Ignoring access window for unknown weekday '{}'.", day);
                    None
                }
            })
            .collect();

        Self::new(windows, access.force_free_window, access.allow_paid_unlock)
    }

    pub fn window_for(&self, weekday: Weekday) -> Option<&MinuteRange> {
        self.windows.get(&weekday)
    }

    /// Whether `now` falls inside today's padded window. Always true when forced.
    pub fn is_within_free_access_window<T: Datelike + Timelike>(&self, now: &T) -> bool {
        if self.force_free_window {
            return true;
        }

        let current_minutes = (now.hour() * 60 + now.minute()) as i32;
        self.windows.get(&now.weekday()).is_some_and(|window| window.contains(current_minutes))
    }

    pub fn unlock_hint(within_free_window: bool) -> UnlockHint {
        match within_free_window {
            true => UnlockHint::FreeUnlock,
            false => UnlockHint::PaymentRequired,
        }
    }

    /// Whether an unpaid printer's tile may open the unlock dialog.
    pub fn may_open_dialog(&self, printer: &Printer, within_free_window: bool) -> bool {
        is_unpaid(printer) && printer.serial.is_some() && (within_free_window || self.allow_paid_unlock)
    }
}

/// A running or paused job counts as unpaid until its checksum has been accepted.
pub fn is_unpaid(printer: &Printer) -> bool {
    if !printer.has_active_job() {
        return false;
    }

    match &printer.last_print {
        None => true,
        Some(last_print) => printer.last_accepted_md5 != last_print.md5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::window::TimeWindow;
    use crate::fleet::models::{LastPrint, PrinterState};
    use chrono::NaiveDate;

    fn printer(state: PrinterState, md5: Option<&str>, accepted: Option<&str>, with_last_print: bool) -> Printer {
        Printer {
            serial: Some("SN".to_string()),
            title: "printer".to_string(),
            state,
            last_print: with_last_print.then(|| LastPrint { file: Some("job.gcode".to_string()), md5: md5.map(str::to_string), title: None }),
            last_accepted_md5: accepted.map(str::to_string),
            gcode_information: None,
            remaining_time_min: None,
            remaining_percentage: None,
        }
    }

    fn default_policy(force: bool) -> AccessPolicy {
        let windows = HashMap::from([
            (Weekday::Fri, TimeWindow { start_minutes: 19 * 60, end_minutes: 22 * 60 }.padded(30)),
            (Weekday::Sat, TimeWindow { start_minutes: 9 * 60 + 30, end_minutes: 13 * 60 + 30 }.padded(30)),
        ]);
        AccessPolicy::new(windows, force, true)
    }

    // 2026-10-23 is a Friday.
    fn at(day: u32, hour: u32, minute: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn idle_finished_and_failed_printers_are_never_unpaid() {
        for state in [PrinterState::Idle, PrinterState::Finish, PrinterState::Error] {
            assert!(!is_unpaid(&printer(state, Some("a"), Some("b"), true)));
            assert!(!is_unpaid(&printer(state, None, None, false)));
        }
    }

    #[test]
    fn active_job_without_last_print_is_unpaid() {
        assert!(is_unpaid(&printer(PrinterState::Running, None, Some("a"), false)));
        assert!(is_unpaid(&printer(PrinterState::Pause, None, None, false)));
    }

    #[test]
    fn active_job_is_unpaid_until_its_checksum_is_accepted() {
        for state in [PrinterState::Running, PrinterState::Pause] {
            assert!(is_unpaid(&printer(state, Some("new"), Some("old"), true)));
            assert!(is_unpaid(&printer(state, Some("new"), None, true)));
            assert!(!is_unpaid(&printer(state, Some("new"), Some("new"), true)));
            assert!(!is_unpaid(&printer(state, None, None, true)));
        }
    }

    #[test]
    fn friday_window_includes_the_buffer() {
        let policy = default_policy(false);

        assert!(policy.is_within_free_access_window(&at(23, 18, 31)));
        assert!(!policy.is_within_free_access_window(&at(23, 18, 29)));
        assert!(policy.is_within_free_access_window(&at(23, 18, 30)));
        assert!(policy.is_within_free_access_window(&at(23, 22, 30)));
        assert!(!policy.is_within_free_access_window(&at(23, 22, 31)));
    }

    #[test]
    fn days_without_a_window_are_never_free() {
        let policy = default_policy(false);

        for day in 19..=22 {
            assert!(!policy.is_within_free_access_window(&at(day, 20, 0)));
        }
        assert!(!policy.is_within_free_access_window(&at(25, 10, 0)));
        assert!(policy.is_within_free_access_window(&at(24, 10, 0)));
    }

    #[test]
    fn forced_window_is_always_free() {
        let policy = default_policy(true);

        assert!(policy.is_within_free_access_window(&at(19, 3, 0)));
    }

    #[test]
    fn paid_unlock_can_be_disabled() {
        let unpaid = printer(PrinterState::Pause, Some("new"), None, true);
        let strict = AccessPolicy::new(HashMap::new(), false, false);

        assert!(default_policy(false).may_open_dialog(&unpaid, false));
        assert!(!strict.may_open_dialog(&unpaid, false));
        assert!(strict.may_open_dialog(&unpaid, true));
    }

    #[test]
    fn unpaired_printers_never_open_the_dialog() {
        let mut unpaid = printer(PrinterState::Pause, Some("new"), None, true);
        unpaid.serial = None;

        assert!(!default_policy(true).may_open_dialog(&unpaid, true));
    }
}
