use convert_case::{Case, Casing};
use snafu::{ResultExt, Snafu};

use crate::fleet::models::Printer;

pub const UPDATE_PRINTER_DATA: &str = "update printer data";
pub const USER_AUTHENTICATED: &str = "user authenticated";
pub const SELECT_PRINTER: &str = "select printer";
pub const DESELECT_PRINTER: &str = "deselect printer";
pub const ACCEPT_PRINT: &str = "accept print";

pub const INBOUND_EVENTS: [&str; 2] = [UPDATE_PRINTER_DATA, USER_AUTHENTICATED];
pub const OUTBOUND_EVENTS: [&str; 3] = [SELECT_PRINTER, DESELECT_PRINTER, ACCEPT_PRINT];

// ///////// //
// Inbound   //
// ///////// //

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Complete fleet snapshot.
    UpdatePrinterData(Vec<Printer>),
    /// A badge was presented while a dialog is open.
    UserAuthenticated(String),
}

impl InboundEvent {
    /// Validates a raw payload received under the given event name.
    pub fn decode(event: &str, payload: &[u8]) -> Result<Self, ChannelError> {
        match event {
            UPDATE_PRINTER_DATA => Ok(InboundEvent::UpdatePrinterData(
                serde_json::from_slice(payload).context(MalformedPayloadSnafu { event })?,
            )),
            USER_AUTHENTICATED => Ok(InboundEvent::UserAuthenticated(
                serde_json::from_slice(payload).context(MalformedPayloadSnafu { event })?,
            )),
            _ => UnknownEventSnafu { event }.fail(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::UpdatePrinterData(_) => UPDATE_PRINTER_DATA,
            InboundEvent::UserAuthenticated(_) => USER_AUTHENTICATED,
        }
    }
}

// ///////// //
// Outbound  //
// ///////// //

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    SelectPrinter(String),
    DeselectPrinter,
    AcceptPrint { automatic: bool },
}

impl OutboundCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundCommand::SelectPrinter(_) => SELECT_PRINTER,
            OutboundCommand::DeselectPrinter => DESELECT_PRINTER,
            OutboundCommand::AcceptPrint { .. } => ACCEPT_PRINT,
        }
    }

    pub fn payload(&self) -> Result<Vec<u8>, ChannelError> {
        let event = self.name();
        match self {
            OutboundCommand::SelectPrinter(serial) => serde_json::to_vec(serial),
            OutboundCommand::DeselectPrinter => serde_json::to_vec(&serde_json::Value::Null),
            OutboundCommand::AcceptPrint { automatic } => serde_json::to_vec(automatic),
        }.context(MalformedPayloadSnafu { event })
    }
}

/// Topic used for an event name, e.g. `printboard/select-printer`.
pub fn topic_for(root_topic: &str, event: &str) -> String {
    format!("{}/{}", root_topic.trim_end_matches('/'), event.to_case(Case::Kebab))
}

/// Reverse of [`topic_for`] for the inbound events.
pub fn inbound_event_for(root_topic: &str, topic: &str) -> Option<&'static str> {
    INBOUND_EVENTS.into_iter().find(|event| topic_for(root_topic, event) == topic)
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ChannelError {
    #[snafu(display("Malformed payload for event '{event}'"))]
    MalformedPayload { event: String, source: serde_json::Error },

    #[snafu(display("Unknown event '{event}'"))]
    UnknownEvent { event: String },

    #[snafu(display("Message on unexpected topic '{topic}'"))]
    UnknownTopic { topic: String },

    #[snafu(display("Invalid channel uri '{uri}'"))]
    InvalidUri { uri: String, source: url::ParseError },

    #[snafu(display("Unsupported channel scheme '{scheme}', expected mqtt or mqtts"))]
    UnsupportedScheme { scheme: String },

    #[snafu(display("Channel uri '{uri}' has no host"))]
    MissingHost { uri: String },

    #[snafu(display("Could not load system certificates"))]
    Certificates { source: std::io::Error },

    #[snafu(display("Could not {action} on the channel"))]
    Client { action: String, source: rumqttc::ClientError },
}
