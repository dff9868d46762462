pub mod config;
pub mod project;
pub mod session;
pub mod stats;

use focusleaf_core::{Config, FocusLeaf};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load the config and open the services over the configured database.
pub fn open_app() -> Result<FocusLeaf, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    Ok(FocusLeaf::open_default(&config)?)
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
