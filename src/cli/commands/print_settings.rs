use anyhow::Result;

use crate::config::Settings;

pub fn print_settings(settings: &Settings) -> Result<()> {
    print!("{}", serde_yaml::to_string(&settings.redacted())?);
    Ok(())
}
