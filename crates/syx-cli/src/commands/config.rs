use anyhow::Context;
use syx_config::SynthexConfig;

use crate::cli::ConfigAction;

pub fn handle(action: &ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = SynthexConfig::load_with_dotenv().context("failed to load configuration")?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
