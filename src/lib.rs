//! Status board and unlock kiosk for a small fleet of networked 3D printers.
//!
//! Printer telemetry and badge authentication are pushed by a server over a
//! real-time channel; the kiosk keeps the latest fleet snapshot, decides per
//! printer whether its job still has to be released, and runs the
//! select/authenticate/pay dialog for the printer a user touched.

pub mod access;
pub mod board;
pub mod channel;
pub mod cli;
pub mod config;
pub mod dialog;
pub mod fleet;
pub mod input;
pub mod kiosk;
pub mod time_format;
