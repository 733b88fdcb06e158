//! Print the merged configuration

use anyhow::Result;

use crate::config::NeonConfig;

pub fn run(config: &NeonConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
