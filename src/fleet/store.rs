use log::debug;

use super::models::Printer;

/// Last-known fleet snapshot as pushed by the server.
///
/// The snapshot is only ever replaced as a whole; nothing on the client side
/// writes into individual printers.
#[derive(Debug, Default)]
pub struct FleetStore {
    printers: Vec<Printer>,
}

impl FleetStore {
    pub fn new(printers: Vec<Printer>) -> Self {
        Self { printers }
    }

    /// Replaces the snapshot. Returns `false` when the new snapshot is identical to the current one.
    pub fn replace(&mut self, printers: Vec<Printer>) -> bool {
        if self.printers == printers {
            debug!("Received identical fleet snapshot of {} printers.", printers.len());
            return false;
        }

        debug!("Replacing fleet snapshot: {} -> {} printers.", self.printers.len(), printers.len());
        self.printers = printers;
        true
    }

    pub fn printers(&self) -> &[Printer] {
        &self.printers
    }

    pub fn get(&self, index: usize) -> Option<&Printer> {
        self.printers.get(index)
    }

    /// Looks up a printer by serial. Printers without a serial never match.
    pub fn find_by_serial(&self, serial: &str) -> Option<&Printer> {
        self.printers.iter().find(|p| p.serial.as_deref() == Some(serial))
    }

    pub fn len(&self) -> usize {
        self.printers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::models::PrinterState;

    fn printer(serial: Option<&str>, title: &str, state: PrinterState) -> Printer {
        Printer {
            serial: serial.map(str::to_string),
            title: title.to_string(),
            state,
            last_print: None,
            last_accepted_md5: None,
            gcode_information: None,
            remaining_time_min: None,
            remaining_percentage: None,
        }
    }

    #[test]
    fn replaces_the_whole_snapshot() {
        let mut store = FleetStore::new(vec![
            printer(Some("A"), "printer 1", PrinterState::Idle),
            printer(Some("B"), "printer 2", PrinterState::Running),
        ]);

        assert!(store.replace(vec![printer(Some("C"), "printer 3", PrinterState::Pause)]));
        assert_eq!(store.len(), 1);
        assert!(store.find_by_serial("A").is_none());
        assert_eq!(store.find_by_serial("C").map(|p| p.title.as_str()), Some("printer 3"));
    }

    #[test]
    fn identical_snapshot_is_reported_unchanged() {
        let snapshot = vec![printer(Some("A"), "printer 1", PrinterState::Idle)];
        let mut store = FleetStore::default();

        assert!(store.replace(snapshot.clone()));
        assert!(!store.replace(snapshot));
    }

    #[test]
    fn printers_without_serial_are_never_found() {
        let store = FleetStore::new(vec![printer(None, "unpaired", PrinterState::Pause)]);

        assert!(store.find_by_serial("").is_none());
        assert_eq!(store.get(0).map(|p| p.title.as_str()), Some("unpaired"));
        assert!(store.get(1).is_none());
    }
}
