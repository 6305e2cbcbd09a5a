use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};
use tokio::{
    fs::{File, create_dir_all, read_to_string, set_permissions},
    io::AsyncWriteExt,
};
use tracing::debug;

/// The database that is used when neither `--database` nor a config file
/// names one
pub const DEFAULT_DATABASE: &str = "sqlite://tasks.sqlite";

#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct Config {
    pub database: String,
}

impl Config {
    fn parse(contents: String) -> Result<Self> {
        serde_json::from_str(&contents).with_context(|| "Couldn't parse json string")
    }

    fn format(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Couldn't convert config to json")
    }

    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        debug!(?p, "Trying to load config");
        let contents = read_to_string(path).await?;
        Self::parse(contents)
    }

    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!(?path, "Saving config");
        if let Some(dir) = path.parent() {
            create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create config directory '{}'", dir.display()))?;
        }
        let mut file = File::create(path).await?;
        let serialized = self.format()?;
        let mut perms = file.metadata().await?.permissions();
        perms.set_mode(0o600);
        set_permissions(path, perms).await?;
        file.write_all(serialized.as_bytes())
            .await
            .with_context(|| "Failed to write config file")?;
        Ok(())
    }

    pub fn new(database: String) -> Self {
        Config { database }
    }
}

/// Location of the taskctl config file. Nothing is created on disk until the
/// config is saved.
pub fn config_file() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("org", "taskseed", "taskctl")
        .ok_or_else(|| anyhow!("Cannot find default project config directory"))?;
    Ok(project_dirs.config_dir().join("config.json"))
}

/// Pick the database to use: an explicitly requested url wins, then the one
/// from the config file, then [DEFAULT_DATABASE]. An unreadable config file is
/// treated like a missing one.
pub async fn resolve_database<P: AsRef<Path>>(requested: Option<String>, config: P) -> String {
    if let Some(url) = requested {
        return url;
    }
    match Config::load_from_file(config).await {
        Ok(cfg) => cfg.database,
        Err(e) => {
            debug!("no usable config file: {e}");
            DEFAULT_DATABASE.to_string()
        }
    }
}
