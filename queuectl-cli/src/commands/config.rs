use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use queuectl_common::config::{validate_config_value, ConfigKey};
use queuectl_store::SqliteStore;

/// `config get [--key KEY]`: prints one resolved value, or every key with
/// its resolved (persisted-or-default) value.
pub async fn get(store: &SqliteStore, key: Option<&str>) -> Result<()> {
    match key {
        Some(raw) => {
            let key = parse_key(raw)?;
            println!("{}={}", key.as_str(), resolved(store, key).await?);
        }
        None => {
            for key in ConfigKey::ALL {
                println!("{}={}", key.as_str(), resolved(store, key).await?);
            }
        }
    }
    Ok(())
}

/// `config set <key> <value>`: validates before persisting (spec §4.5);
/// an unknown key or an invalid value is an input error (spec §7).
pub async fn set(store: &SqliteStore, key: &str, value: &str) -> Result<()> {
    let key = parse_key(key)?;
    let normalized = validate_config_value(key, value).map_err(|error| anyhow!(error.to_string()))?;
    store
        .config_set(key.as_str(), &normalized)
        .await
        .context("failed to persist config")?;
    println!("{}={normalized}", key.as_str());
    Ok(())
}

fn parse_key(raw: &str) -> Result<ConfigKey> {
    ConfigKey::from_str(raw).map_err(|error| anyhow!(error.to_string()))
}

async fn resolved(store: &SqliteStore, key: ConfigKey) -> Result<String> {
    Ok(store
        .config_get(key.as_str())
        .await?
        .unwrap_or_else(|| key.default_value().to_owned()))
}
