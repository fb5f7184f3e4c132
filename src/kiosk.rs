use std::collections::HashMap;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use log::debug;

use crate::access::policy::AccessPolicy;
use crate::board::text::{render_dialog, render_tile};
use crate::board::tile::{tile_view, TileView};
use crate::channel::models::{InboundEvent, OutboundCommand};
use crate::dialog::machine::{DialogView, PaymentMode, UnlockDialog};
use crate::fleet::store::FleetStore;
use crate::input::debounce::Debounced;

/// Something on the screen that can be touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchTarget {
    Tile(usize),
    Close,
    Payment(PaymentMode),
}

impl FromStr for TouchTarget {
    type Err = String;

    /// Parses a line of terminal input: `tap <index>`, `close`, `auto` or `manual`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let target = match (words.next(), words.next()) {
            (Some("tap"), Some(index)) => index.parse().map(TouchTarget::Tile).map_err(|_| format!("Invalid tile '{index}'"))?,
            (Some("close"), None) => TouchTarget::Close,
            (Some("auto"), None) => TouchTarget::Payment(PaymentMode::Automatic),
            (Some("manual"), None) => TouchTarget::Payment(PaymentMode::Manual),
            _ => return Err(format!("Unknown input '{}'", line.trim())),
        };

        match words.next() {
            None => Ok(target),
            Some(_) => Err(format!("Unknown input '{}'", line.trim())),
        }
    }
}

type TouchHandler = Box<dyn FnMut(Option<Instant>) -> TouchTarget + Send>;

fn handler_for(target: TouchTarget) -> TouchHandler {
    Box::new(move |touched_at: Option<Instant>| {
        if let Some(touched_at) = touched_at {
            debug!("Touch on {:?} handled {:?} after it landed.", target, touched_at.elapsed());
        }
        target
    })
}

/// The event-processing context. Owns the fleet snapshot, the dialog, and one
/// debouncer per touchable element; nothing else writes to them.
pub struct Kiosk {
    fleet: FleetStore,
    policy: AccessPolicy,
    dialog: UnlockDialog,
    cool_down: Duration,
    touchables: HashMap<TouchTarget, Debounced<TouchHandler>>,
}

impl Kiosk {
    pub fn new(policy: AccessPolicy, cool_down: Duration) -> Self {
        Self { fleet: FleetStore::default(), policy, dialog: UnlockDialog::new(), cool_down, touchables: HashMap::new() }
    }

    pub fn fleet(&self) -> &FleetStore {
        &self.fleet
    }

    pub fn dialog(&self) -> &UnlockDialog {
        &self.dialog
    }

    pub fn within_free_window(&self, now: &NaiveDateTime) -> bool {
        self.policy.is_within_free_access_window(now)
    }

    pub fn handle_inbound(&mut self, event: InboundEvent, now: &NaiveDateTime) -> Vec<OutboundCommand> {
        debug!("Handling inbound '{}'.", event.name());
        match event {
            InboundEvent::UpdatePrinterData(printers) => {
                if !self.fleet.replace(printers) {
                    return vec![];
                }
                self.sync_tiles();
                let commands = self.dialog.on_fleet_update(&self.fleet);
                self.sync_dialog_buttons();
                commands
            },
            InboundEvent::UserAuthenticated(identity) => {
                let within_free_window = self.within_free_window(now);
                self.dialog.authenticate(identity, &self.fleet, within_free_window);
                vec![]
            },
        }
    }

    /// Runs a touch through its debouncer and applies the resulting action.
    pub fn handle_touch(&mut self, target: TouchTarget, at: Instant, now: &NaiveDateTime) -> Vec<OutboundCommand> {
        let within_free_window = self.within_free_window(now);
        if let TouchTarget::Tile(index) = target {
            let activatable = self.fleet.get(index).is_some_and(|p| self.policy.may_open_dialog(p, within_free_window));
            if !activatable || self.dialog.is_open() {
                return vec![];
            }
        }

        let Some(debounced) = self.touchables.get_mut(&target) else {
            debug!("Nothing to touch at {:?}.", target);
            return vec![];
        };
        let Some(target) = debounced.activate_at(at, at) else {
            return vec![];
        };

        let commands = match target {
            TouchTarget::Tile(index) => match self.fleet.get(index) {
                Some(printer) => self.dialog.open(printer),
                None => vec![],
            },
            TouchTarget::Close => self.dialog.close(),
            TouchTarget::Payment(mode) => self.dialog.choose_payment(mode, &self.fleet, within_free_window),
        };
        self.sync_dialog_buttons();
        commands
    }

    pub fn tiles(&self, now: &NaiveDateTime) -> Vec<TileView> {
        let within_free_window = self.within_free_window(now);
        self.fleet.printers().iter().map(|p| tile_view(p, &self.policy, within_free_window)).collect()
    }

    pub fn dialog_view(&self, now: &NaiveDateTime) -> Option<DialogView> {
        self.dialog.view(&self.fleet, self.within_free_window(now))
    }

    pub fn render(&self, now: &NaiveDateTime) -> Vec<String> {
        let mut lines: Vec<String> = self.tiles(now).iter().enumerate().map(|(i, tile)| render_tile(i, tile)).collect();
        if let Some(view) = self.dialog_view(now) {
            lines.extend(render_dialog(&view));
        }
        lines
    }

    /// Tears down every touch handler and closes an open dialog.
    pub fn shutdown(&mut self) -> Vec<OutboundCommand> {
        for (_, mut debounced) in self.touchables.drain() {
            debounced.dispose();
        }
        self.dialog.close()
    }

    fn sync_tiles(&mut self) {
        let count = self.fleet.len();
        self.touchables.retain(|target, debounced| match target {
            TouchTarget::Tile(index) if *index >= count => {
                debounced.dispose();
                false
            },
            _ => true,
        });
        for index in 0..count {
            self.install(TouchTarget::Tile(index));
        }
    }

    fn sync_dialog_buttons(&mut self) {
        let buttons = [TouchTarget::Close, TouchTarget::Payment(PaymentMode::Automatic), TouchTarget::Payment(PaymentMode::Manual)];
        if self.dialog.is_open() {
            for button in buttons {
                self.install(button);
            }
        } else {
            for button in buttons {
                if let Some(mut debounced) = self.touchables.remove(&button) {
                    debounced.dispose();
                }
            }
        }
    }

    fn install(&mut self, target: TouchTarget) {
        let cool_down = self.cool_down;
        self.touchables.entry(target).or_insert_with(|| {
            debug!("Wiring touch handler for {:?}.", target);
            // Tiles pass their touch on for latency logging, dialog buttons do not.
            let with_event = matches!(target, TouchTarget::Tile(_));
            Debounced::new(handler_for(target), cool_down).with_event(with_event)
        });
    }
}
