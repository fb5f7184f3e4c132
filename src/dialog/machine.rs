use log::debug;

use crate::access::policy::is_unpaid;
use crate::board::tile::{duration_label, weight_label};
use crate::channel::models::OutboundCommand;
use crate::fleet::models::{Printer, PrinterState};
use crate::fleet::store::FleetStore;
use crate::time_format::minutes_to_time_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    /// Free window, waiting for a badge.
    Locked,
    /// Free window, badge presented, payment path not chosen yet.
    Authenticated,
    /// Outside the free window, only manual payment is offered.
    PaidFlow,
    /// Payment path chosen, waiting for the printer to leave PAUSE.
    Resuming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMode {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    serial: String,
    authenticated_identity: Option<String>,
    resuming: bool,
}

/// What the presentation layer shows inside the dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogView {
    pub title: &'static str,
    pub state: DialogState,
    pub printer_title: Option<String>,
    pub identity: Option<String>,
    pub job_label: String,
    pub weight_label: Option<String>,
    pub duration_label: Option<String>,
    /// Time left on a running job, e.g. `1 u 5 m`.
    pub remaining_label: Option<String>,
}

/// Unlock/payment dialog for a single selected printer.
///
/// Every operation returns the commands to emit upstream, in order. A
/// `SelectPrinter` for a session is always emitted before any `AcceptPrint`.
#[derive(Debug, Default)]
pub struct UnlockDialog {
    session: Option<Session>,
}

impl UnlockDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, within_free_window: bool) -> DialogState {
        match &self.session {
            None => DialogState::Closed,
            Some(session) if session.resuming => DialogState::Resuming,
            Some(_) if !within_free_window => DialogState::PaidFlow,
            Some(session) if session.authenticated_identity.is_some() => DialogState::Authenticated,
            Some(_) => DialogState::Locked,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn selected_serial(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.serial.as_str())
    }

    pub fn authenticated_identity(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.authenticated_identity.as_deref())
    }

    pub fn is_resuming(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.resuming)
    }

    /// Opens the dialog on an unpaid printer. Ignored while another session is open.
    pub fn open(&mut self, printer: &Printer) -> Vec<OutboundCommand> {
        if self.session.is_some() || !is_unpaid(printer) {
            return vec![];
        }
        let Some(serial) = printer.serial.clone() else {
            return vec![];
        };

        debug!("Opening unlock dialog for {} ({}).", printer.title, serial);
        self.session = Some(Session { serial: serial.clone(), authenticated_identity: None, resuming: false });
        vec![OutboundCommand::SelectPrinter(serial)]
    }

    /// Records the identity reported by the badge reader.
    ///
    /// Only applies in the free window, before a payment path was chosen, and
    /// while the selected printer is still part of the fleet.
    pub fn authenticate(&mut self, identity: String, fleet: &FleetStore, within_free_window: bool) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!("Ignoring authentication of {} without an open dialog.", identity);
            return false;
        };
        if !within_free_window || session.resuming || fleet.find_by_serial(&session.serial).is_none() {
            debug!("Ignoring authentication of {} for {}.", identity, session.serial);
            return false;
        }

        debug!("Authenticated {} for {}.", identity, session.serial);
        session.authenticated_identity = Some(identity);
        true
    }

    /// Commits to a payment path and asks the server to accept the print.
    pub fn choose_payment(&mut self, mode: PaymentMode, fleet: &FleetStore, within_free_window: bool) -> Vec<OutboundCommand> {
        let allowed = match (self.state(within_free_window), mode) {
            (DialogState::Authenticated, _) => true,
            (DialogState::PaidFlow, PaymentMode::Manual) => true,
            _ => false,
        };
        let Some(session) = self.session.as_mut() else {
            return vec![];
        };
        if !allowed || fleet.find_by_serial(&session.serial).is_none() {
            debug!("Ignoring {:?} payment for {}.", mode, session.serial);
            return vec![];
        }

        debug!("{:?} payment chosen for {}, waiting for it to resume.", mode, session.serial);
        session.resuming = true;
        let mut commands = vec![OutboundCommand::AcceptPrint { automatic: mode == PaymentMode::Automatic }];

        // A running job has nothing left to resume.
        if fleet.find_by_serial(&session.serial).is_some_and(|p| p.state != PrinterState::Pause) {
            debug!("{} is not paused, closing unlock dialog.", session.serial);
            self.session = None;
            commands.push(OutboundCommand::DeselectPrinter);
        }
        commands
    }

    /// Explicit close by the user.
    pub fn close(&mut self) -> Vec<OutboundCommand> {
        match self.session.take() {
            Some(session) => {
                debug!("Closing unlock dialog for {}.", session.serial);
                vec![OutboundCommand::DeselectPrinter]
            }
            None => vec![],
        }
    }

    /// Reacts to a changed fleet snapshot.
    ///
    /// Closes the dialog once a resuming printer left PAUSE, otherwise renews
    /// the selection upstream. A printer missing from the snapshot is left alone.
    pub fn on_fleet_update(&mut self, fleet: &FleetStore) -> Vec<OutboundCommand> {
        let Some(session) = self.session.as_ref() else {
            return vec![];
        };
        let Some(printer) = fleet.find_by_serial(&session.serial) else {
            debug!("Selected printer {} is missing from the snapshot.", session.serial);
            return vec![];
        };

        if session.resuming && printer.state != PrinterState::Pause {
            debug!("{} resumed, closing unlock dialog.", session.serial);
            self.session = None;
            return vec![OutboundCommand::DeselectPrinter];
        }

        vec![OutboundCommand::SelectPrinter(session.serial.clone())]
    }

    pub fn view(&self, fleet: &FleetStore, within_free_window: bool) -> Option<DialogView> {
        let session = self.session.as_ref()?;
        let printer = fleet.find_by_serial(&session.serial);
        let gcode = printer.and_then(|p| p.gcode_information.as_ref());

        Some(DialogView {
            title: if within_free_window { "Vrijgeven" } else { "Afrekenen" },
            state: self.state(within_free_window),
            printer_title: printer.map(|p| p.title.clone()),
            identity: session.authenticated_identity.clone(),
            job_label: printer.and_then(Printer::job_name).unwrap_or("Onbekend").to_string(),
            weight_label: gcode.map(|g| weight_label(g.weight)),
            duration_label: gcode.map(|g| duration_label(g.estimated_time)),
            remaining_label: printer
                .filter(|p| p.state == PrinterState::Running)
                .and_then(|p| p.remaining_time_min)
                .map(|minutes| minutes_to_time_text(minutes, false)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::models::{GcodeInformation, LastPrint};

    fn printer(serial: &str, state: PrinterState, accepted: Option<&str>) -> Printer {
        Printer {
            serial: Some(serial.to_string()),
            title: format!("printer {serial}"),
            state,
            last_print: Some(LastPrint { file: Some("potato.gcode".to_string()), md5: Some("md5-job".to_string()), title: None }),
            last_accepted_md5: accepted.map(str::to_string),
            gcode_information: Some(GcodeInformation { length: 2280.2, weight: 6.86, estimated_time: 940.0 }),
            remaining_time_min: None,
            remaining_percentage: None,
        }
    }

    fn fleet(printers: Vec<Printer>) -> FleetStore {
        FleetStore::new(printers)
    }

    #[test]
    fn free_window_round_trip_closes_when_printer_resumes() {
        let mut store = fleet(vec![printer("A", PrinterState::Pause, None)]);
        let mut dialog = UnlockDialog::new();

        assert_eq!(dialog.open(store.get(0).unwrap()), vec![OutboundCommand::SelectPrinter("A".to_string())]);
        assert_eq!(dialog.state(true), DialogState::Locked);

        assert!(dialog.authenticate("bob".to_string(), &store, true));
        assert_eq!(dialog.state(true), DialogState::Authenticated);
        assert_eq!(dialog.authenticated_identity(), Some("bob"));

        assert_eq!(dialog.choose_payment(PaymentMode::Automatic, &store, true), vec![OutboundCommand::AcceptPrint { automatic: true }]);
        assert_eq!(dialog.state(true), DialogState::Resuming);

        // Still paused: keep waiting and renew the selection.
        assert_eq!(dialog.on_fleet_update(&store), vec![OutboundCommand::SelectPrinter("A".to_string())]);
        assert!(dialog.is_resuming());

        store.replace(vec![printer("A", PrinterState::Running, Some("md5-job"))]);
        dialog.on_fleet_update(&store);
        assert_eq!(dialog.state(true), DialogState::Closed);
        assert_eq!(dialog.authenticated_identity(), None);
        assert!(!dialog.is_resuming());
    }

    #[test]
    fn paying_for_a_running_job_closes_right_away() {
        let store = fleet(vec![printer("A", PrinterState::Running, None)]);
        let mut dialog = UnlockDialog::new();
        dialog.open(store.get(0).unwrap());
        dialog.authenticate("bob".to_string(), &store, true);

        assert_eq!(
            dialog.choose_payment(PaymentMode::Automatic, &store, true),
            vec![OutboundCommand::AcceptPrint { automatic: true }, OutboundCommand::DeselectPrinter]
        );
        assert_eq!(dialog.state(true), DialogState::Closed);
        assert_eq!(dialog.authenticated_identity(), None);
        assert!(!dialog.is_resuming());
    }

    #[test]
    fn view_shows_remaining_time_while_running() {
        let mut running = printer("A", PrinterState::Running, None);
        running.remaining_time_min = Some(65);
        let store = fleet(vec![running]);
        let mut dialog = UnlockDialog::new();
        dialog.open(store.get(0).unwrap());

        assert_eq!(dialog.view(&store, false).unwrap().remaining_label.as_deref(), Some("1 u 5 m"));
    }

    #[test]
    fn paid_flow_only_accepts_manual_payment() {
        let store = fleet(vec![printer("A", PrinterState::Pause, None)]);
        let mut dialog = UnlockDialog::new();
        dialog.open(store.get(0).unwrap());

        assert_eq!(dialog.state(false), DialogState::PaidFlow);
        assert!(!dialog.authenticate("bob".to_string(), &store, false));
        assert!(dialog.choose_payment(PaymentMode::Automatic, &store, false).is_empty());
        assert_eq!(dialog.choose_payment(PaymentMode::Manual, &store, false), vec![OutboundCommand::AcceptPrint { automatic: false }]);
        assert_eq!(dialog.state(false), DialogState::Resuming);
    }

    #[test]
    fn locked_dialog_accepts_no_payment() {
        let store = fleet(vec![printer("A", PrinterState::Pause, None)]);
        let mut dialog = UnlockDialog::new();
        dialog.open(store.get(0).unwrap());

        assert!(dialog.choose_payment(PaymentMode::Manual, &store, true).is_empty());
        assert!(dialog.choose_payment(PaymentMode::Automatic, &store, true).is_empty());
        assert_eq!(dialog.state(true), DialogState::Locked);
    }

    #[test]
    fn payment_without_session_emits_nothing() {
        let store = fleet(vec![printer("A", PrinterState::Pause, None)]);
        let mut dialog = UnlockDialog::new();

        assert!(dialog.choose_payment(PaymentMode::Manual, &store, false).is_empty());
        assert!(!dialog.authenticate("bob".to_string(), &store, true));
        assert!(dialog.close().is_empty());
    }

    #[test]
    fn explicit_close_deselects_and_resets() {
        let store = fleet(vec![printer("A", PrinterState::Pause, None)]);
        let mut dialog = UnlockDialog::new();
        dialog.open(store.get(0).unwrap());
        dialog.authenticate("bob".to_string(), &store, true);
        dialog.choose_payment(PaymentMode::Manual, &store, true);

        assert_eq!(dialog.close(), vec![OutboundCommand::DeselectPrinter]);
        assert_eq!(dialog.state(true), DialogState::Closed);

        dialog.open(store.get(0).unwrap());
        assert_eq!(dialog.authenticated_identity(), None);
        assert!(!dialog.is_resuming());
    }

    #[test]
    fn only_unpaid_printers_with_serial_open() {
        let mut dialog = UnlockDialog::new();
        let paid = printer("A", PrinterState::Pause, Some("md5-job"));
        let mut unpaired = printer("B", PrinterState::Pause, None);
        unpaired.serial = None;

        assert!(dialog.open(&paid).is_empty());
        assert!(dialog.open(&unpaired).is_empty());
        assert!(!dialog.is_open());
    }

    #[test]
    fn second_open_is_ignored() {
        let first = printer("A", PrinterState::Pause, None);
        let second = printer("B", PrinterState::Running, None);
        let mut dialog = UnlockDialog::new();

        dialog.open(&first);
        assert!(dialog.open(&second).is_empty());
        assert_eq!(dialog.selected_serial(), Some("A"));
    }

    #[test]
    fn stale_selection_is_ignored() {
        let mut store = fleet(vec![printer("A", PrinterState::Pause, None)]);
        let mut dialog = UnlockDialog::new();
        dialog.open(store.get(0).unwrap());

        store.replace(vec![printer("B", PrinterState::Pause, None)]);
        assert!(dialog.on_fleet_update(&store).is_empty());
        assert!(!dialog.authenticate("bob".to_string(), &store, true));
        assert_eq!(dialog.selected_serial(), Some("A"));
    }

    #[test]
    fn authentication_after_payment_is_ignored() {
        let store = fleet(vec![printer("A", PrinterState::Pause, None)]);
        let mut dialog = UnlockDialog::new();
        dialog.open(store.get(0).unwrap());
        dialog.authenticate("bob".to_string(), &store, true);
        dialog.choose_payment(PaymentMode::Automatic, &store, true);

        assert!(!dialog.authenticate("alice".to_string(), &store, true));
        assert_eq!(dialog.authenticated_identity(), Some("bob"));
    }

    #[test]
    fn view_describes_the_selected_job() {
        let store = fleet(vec![printer("A", PrinterState::Pause, None)]);
        let mut dialog = UnlockDialog::new();
        assert!(dialog.view(&store, true).is_none());
        dialog.open(store.get(0).unwrap());

        let view = dialog.view(&store, true).unwrap();
        assert_eq!(view.title, "Vrijgeven");
        assert_eq!(view.job_label, "potato.gcode");
        assert_eq!(view.weight_label.as_deref(), Some("~ 6.86 gram"));
        assert_eq!(view.duration_label.as_deref(), Some("~ 00:15:40"));

        assert_eq!(dialog.view(&store, false).unwrap().title, "Afrekenen");
    }
}
