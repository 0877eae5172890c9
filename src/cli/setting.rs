//! Setting command - print one configuration value

use anstream::println;
use force_rebase::config::Config;
use force_rebase::error::Result;

/// Run the setting command
pub fn run_setting(config: &Config, name: &str) -> Result<()> {
    println!("{}", config.setting(name)?);
    Ok(())
}
