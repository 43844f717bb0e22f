use crate::domain::coin::BuilderFamily;
use crate::domain::payment::NetworkParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["walletflow.toml", "config/walletflow.toml"];

/// Days a card deposit locks withdrawals when the API does not say otherwise.
pub const WITHDRAW_LOCK_DEFAULT_DAYS: u32 = 7;

const DEFAULT_QUOTE_POLL_INTERVAL_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworksConfig {
    pub btc: String,
    pub bch: String,
    pub eth_chain_id: u64,
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self {
            btc: "bitcoin".to_string(),
            bch: "bitcoincash".to_string(),
            eth_chain_id: 1,
        }
    }
}

impl NetworksConfig {
    /// XLM drafts are created without network parameters.
    pub fn params(&self, family: BuilderFamily) -> Option<NetworkParams> {
        match family {
            BuilderFamily::Btc => Some(NetworkParams::Bitcoin {
                name: self.btc.clone(),
            }),
            BuilderFamily::Bch => Some(NetworkParams::Bitcoin {
                name: self.bch.clone(),
            }),
            BuilderFamily::Eth => Some(NetworkParams::Ethereum {
                chain_id: self.eth_chain_id,
            }),
            BuilderFamily::Xlm => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub quote_poll_interval_secs: u64,
    pub withdraw_lock_default_days: u32,
    pub fiat_currency: String,
    /// Report a `BAD_2FA` exchange-account failure as a success whose address
    /// is the error tag. Consumers of the exchange-account slice rely on it.
    pub mask_bad_2fa: bool,
    pub networks: NetworksConfig,
    pub logging: LoggingConfig,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            quote_poll_interval_secs: DEFAULT_QUOTE_POLL_INTERVAL_SECS,
            withdraw_lock_default_days: WITHDRAW_LOCK_DEFAULT_DAYS,
            fiat_currency: "USD".to_string(),
            mask_bad_2fa: true,
            networks: NetworksConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl FlowConfig {
    pub fn quote_poll_interval(&self) -> Duration {
        Duration::from_secs(self.quote_poll_interval_secs)
    }

    fn validate(&self) -> Result<(), String> {
        if self.quote_poll_interval_secs == 0 {
            return Err("quote_poll_interval_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Loads the config from `path`, or from the first default path that exists.
/// Falls back to defaults when no file is found.
pub fn load_config(path: Option<PathBuf>) -> Result<FlowConfig, ConfigError> {
    let candidates = match path {
        Some(p) => vec![p],
        None => DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect(),
    };

    for candidate in candidates {
        if let Some(config) = try_load_file(&candidate)? {
            return Ok(config);
        }
    }

    Ok(FlowConfig::default())
}

fn try_load_file(path: &Path) -> Result<Option<FlowConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: FlowConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate().map_err(|reason| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(Some(config))
}
