use crate::{
    cli::ConfigCommands,
    config::{Config, resolve_database},
};
use anyhow::Result;
use std::path::Path;

pub(crate) async fn handle_command(
    command: ConfigCommands,
    requested: Option<String>,
    config_file: &Path,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("Config file: '{}'", config_file.display());
            println!(
                "Using database '{}'",
                resolve_database(requested, config_file).await
            );
            Ok(())
        }
        ConfigCommands::SetDatabase { url } => {
            Config::new(url.clone()).save_to_file(config_file).await?;
            println!("Default database set to '{url}'");
            Ok(())
        }
    }
}
