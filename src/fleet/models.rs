use serde_derive::{Deserialize, Serialize};

// Every field the server may leave out is optional here, so a partial
// record still deserializes and renders as "unknown".

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Printer {
    #[serde(default)]
    pub serial: Option<String>,
    pub title: String,
    pub state: PrinterState,
    #[serde(default)]
    pub last_print: Option<LastPrint>,
    #[serde(default)]
    pub last_accepted_md5: Option<String>,
    #[serde(default)]
    pub gcode_information: Option<GcodeInformation>,
    #[serde(default)]
    pub remaining_time_min: Option<i64>,
    #[serde(default)]
    pub remaining_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LastPrint {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcodeInformation {
    pub length: f64,
    pub weight: f64,
    pub estimated_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrinterState {
    Idle,
    Error,
    Finish,
    Running,
    Pause,
}

impl Printer {
    /// Whether the printer is busy with a job, running or paused.
    pub fn has_active_job(&self) -> bool {
        matches!(self.state, PrinterState::Running | PrinterState::Pause)
    }

    /// Name of the last started job, preferring its title over the file name.
    pub fn job_name(&self) -> Option<&str> {
        let last_print = self.last_print.as_ref()?;
        last_print.title.as_deref().or(last_print.file.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_complete_record() {
        let printer: Printer = serde_json::from_str(r#"{
            "serial": "SN-3",
            "title": "printer 3",
            "state": "PAUSE",
            "last_print": { "file": "pending potato.gcode", "md5": "nothing" },
            "last_accepted_md5": "something",
            "gcode_information": { "length": 2280.2, "weight": 6.86, "estimated_time": 940 },
            "remaining_time_min": 12,
            "remaining_percentage": 40
        }"#).unwrap();

        assert_eq!(printer.serial.as_deref(), Some("SN-3"));
        assert_eq!(printer.state, PrinterState::Pause);
        assert_eq!(printer.last_print.as_ref().and_then(|p| p.md5.as_deref()), Some("nothing"));
        assert_eq!(printer.gcode_information.as_ref().map(|g| g.weight), Some(6.86));
        assert_eq!(printer.remaining_time_min, Some(12));
    }

    #[test]
    fn missing_and_null_fields_degrade_to_unknown() {
        let printer: Printer = serde_json::from_str(r#"{
            "title": "printer 1",
            "state": "IDLE",
            "last_print": null
        }"#).unwrap();

        assert_eq!(printer.serial, None);
        assert_eq!(printer.last_print, None);
        assert_eq!(printer.gcode_information, None);
        assert_eq!(printer.job_name(), None);
    }

    #[test]
    fn job_name_prefers_title_over_file() {
        let mut printer: Printer = serde_json::from_str(r#"{
            "title": "printer 2",
            "state": "FINISH",
            "last_print": { "file": "finished print.gcode" }
        }"#).unwrap();
        assert_eq!(printer.job_name(), Some("finished print.gcode"));

        printer.last_print.as_mut().unwrap().title = Some("Benchy".to_string());
        assert_eq!(printer.job_name(), Some("Benchy"));
    }

    #[test]
    fn rejects_unknown_states() {
        let result = serde_json::from_str::<Printer>(r#"{ "title": "x", "state": "EXPLODED" }"#);
        assert!(result.is_err());
    }
}
