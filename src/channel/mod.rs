pub mod client;
pub mod models;
mod tls;
