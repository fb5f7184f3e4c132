use config::{Config, ConfigError, Environment, File};
use log::info;

use super::models::Settings;

pub fn load_config() -> Result<Settings, ConfigError> {
    // As Rust has no native support for .env files,
    // we use the dotenv_flow crate to import to actual ENV vars.
    if let Ok(dotenv_path) = dotenv_flow::dotenv_flow() {
        info!("Loaded dotenv file: {:?}", dotenv_path);
    }

    let config = Config::builder()
        .add_source(File::with_name("printboard").required(false))
        .add_source(Environment::default()
            .prefix("PB")
            .separator("_")
            .prefix_separator("_")
            .try_parsing(true))
        .set_default("channel.uri", "mqtt://localhost:1883")?
        .set_default("channel.clientid", "printboard")?
        .set_default("channel.roottopic", "printboard")?
        .set_default("channel.username", "")?
        .set_default("channel.password", "")?
        .set_default("channel.keepalive", "10s")?
        .set_default("channel.failurewait", "30s")?
        .set_default("access.buffer", "30m")?
        .set_default("access.forcefreewindow", false)?
        .set_default("access.allowpaidunlock", true)?
        .set_default("input.debouncetime", "500ms")?
        .set_default("board.refresh", "30s")?
        .build()?;

    config.try_deserialize()
}
