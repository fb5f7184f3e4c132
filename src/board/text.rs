use crate::access::policy::UnlockHint;
use crate::dialog::machine::{DialogState, DialogView};

use super::tile::TileView;

// Terminal stand-in for the kiosk screen.

pub fn render_tile(index: usize, tile: &TileView) -> String {
    let overlay = match tile.hint {
        Some(UnlockHint::FreeUnlock) => " [unlock]",
        Some(UnlockHint::PaymentRequired) => " [pay]",
        None => "",
    };
    let state = if tile.display_state.is_empty() { format!("{:?}", tile.category) } else { tile.display_state.clone() };

    format!(
        "{index}: {} | {} | {} | {} | {}{}",
        tile.title, state, tile.job_label, tile.weight_label, tile.duration_label, overlay
    )
}

pub fn render_dialog(view: &DialogView) -> Vec<String> {
    let mut lines = vec![format!("== {} {} ==", view.title, view.printer_title.as_deref().unwrap_or(""))];

    match view.state {
        DialogState::Closed => {}
        DialogState::Resuming => lines.push("Bezig met hervatten...".to_string()),
        DialogState::Authenticated => {
            lines.push(format!("Gebruiker gevonden: {}", view.identity.as_deref().unwrap_or("")));
            lines.push("[auto] Automatisch afrekenen & hervatten".to_string());
            lines.push("[manual] Handmatig afrekenen & hervatten".to_string());
        }
        DialogState::Locked => {
            lines.push("Vraag een begeleider".to_string());
            lines.push(format!("Bestand: {}", view.job_label));
            if let Some(weight) = &view.weight_label {
                lines.push(format!("Gewicht: {weight}"));
            }
            if let Some(duration) = &view.duration_label {
                lines.push(format!("Duratie: {duration}"));
            }
        }
        DialogState::PaidFlow => {
            lines.push("Bied je iButton aan, of:".to_string());
            lines.push("[manual] Ik reken handmatig af.".to_string());
        }
    }

    if let Some(remaining) = &view.remaining_label {
        lines.push(format!("Resterend: {remaining}"));
    }
    lines.push("[close] Sluiten".to_string());
    lines
}
