//! `concierge config`: show the effective configuration.

use concierge_config::AppConfig;

pub fn show(config: &AppConfig) {
    println!("{}", config.to_toml());
}

pub fn path() {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
}
