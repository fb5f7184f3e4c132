use crate::access::policy::{is_unpaid, AccessPolicy, UnlockHint};
use crate::fleet::models::{Printer, PrinterState};
use crate::time_format::seconds_to_time;

/// Visual category of a tile. Mirrors the printer state one to one.
pub type TileCategory = PrinterState;

#[derive(Debug, Clone, PartialEq)]
pub struct TileView {
    pub category: TileCategory,
    pub title: String,
    pub display_state: String,
    pub job_label: String,
    pub weight_label: String,
    pub duration_label: String,
    pub unpaid: bool,
    /// Only set for unpaid printers.
    pub hint: Option<UnlockHint>,
    /// Whether touching the tile opens the unlock dialog.
    pub activatable: bool,
}

/// Pure mapping from a printer and the current window result to what its tile shows.
pub fn tile_view(printer: &Printer, policy: &AccessPolicy, within_free_window: bool) -> TileView {
    let unpaid = is_unpaid(printer);
    let gcode = printer.gcode_information.as_ref();

    TileView {
        category: printer.state,
        title: printer.title.clone(),
        display_state: display_state(printer),
        job_label: printer.job_name().unwrap_or("-").to_string(),
        weight_label: gcode.map_or_else(|| "0 gram".to_string(), |g| weight_label(g.weight)),
        duration_label: gcode.map_or_else(|| "00:00:00".to_string(), |g| duration_label(g.estimated_time)),
        unpaid,
        hint: unpaid.then(|| AccessPolicy::unlock_hint(within_free_window)),
        activatable: policy.may_open_dialog(printer, within_free_window),
    }
}

pub fn display_state(printer: &Printer) -> String {
    match printer.state {
        PrinterState::Idle => String::new(),
        PrinterState::Finish => "Afgerond".to_string(),
        PrinterState::Error => "Foutmelding".to_string(),
        PrinterState::Pause => "Gepauzeerd".to_string(),
        PrinterState::Running => {
            let percentage = printer.remaining_percentage.unwrap_or(0.0);
            match printer.remaining_time_min {
                Some(minutes) if minutes > 0 => format!("Bezig {percentage}% {minutes} min."),
                _ => format!("Bezig {percentage}%"),
            }
        }
    }
}

pub fn weight_label(weight: f64) -> String {
    format!("~ {weight} gram")
}

pub fn duration_label(estimated_seconds: f64) -> String {
    format!("~ {}", seconds_to_time(estimated_seconds.round().max(0.0) as u64))
}
