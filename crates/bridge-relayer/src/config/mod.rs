use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `[global] private_key`.
pub const PRIVATE_KEY_ENV: &str = "RELAYER_PRIVATE_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayerConfig {
    pub global: GlobalConfig,
    pub chains: HashMap<String, ChainConfig>,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Log level for the relayer
    pub log_level: String,
    /// Hex-encoded signing key used on both networks;
    /// the RELAYER_PRIVATE_KEY environment variable takes precedence
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Numeric chain identifier (EIP-155), also the routing identifier
    /// embedded in deposit events addressed to this network
    pub chain_id: u64,
    /// WebSocket endpoint used for both the event subscription and
    /// transaction submission
    pub ws_endpoint: String,
    /// Bridge contract address (0x-prefixed hex)
    pub contract_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics collection
    pub enabled: bool,
    /// Metrics host
    pub host: String,
    /// Metrics port
    pub port: u16,
}

impl RelayerConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.as_ref().display()))?;
        let config: RelayerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Every setting is required for start-up; a missing or malformed one
    /// must stop the process here rather than fail mid-run.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chains.len() != 2 {
            bail!(
                "exactly two [chains] entries are required, found {}",
                self.chains.len()
            );
        }

        for (name, chain) in &self.chains {
            if !chain.ws_endpoint.starts_with("ws://") && !chain.ws_endpoint.starts_with("wss://")
            {
                bail!("chain {name}: ws_endpoint must be a ws:// or wss:// URL");
            }
            validate_contract_address(&chain.contract_address)
                .with_context(|| format!("chain {name}: invalid contract_address"))?;
        }

        let ((name_a, chain_a), (name_b, chain_b)) = self.chain_pair()?;
        if chain_a.chain_id == chain_b.chain_id {
            bail!(
                "chains {name_a} and {name_b} share chain_id {}",
                chain_a.chain_id
            );
        }

        self.signing_key()?;
        Ok(())
    }

    /// The signing key, from the environment or from `[global]`.
    pub fn signing_key(&self) -> anyhow::Result<String> {
        let key = std::env::var(PRIVATE_KEY_ENV)
            .ok()
            .or_else(|| self.global.private_key.clone())
            .ok_or_else(|| {
                anyhow!("no signing key: set {PRIVATE_KEY_ENV} or [global] private_key")
            })?;
        let bytes = hex::decode(key.strip_prefix("0x").unwrap_or(&key))
            .map_err(|e| anyhow!("signing key is not valid hex: {e}"))?;
        if bytes.len() != 32 {
            bail!("signing key must be 32 bytes, found {}", bytes.len());
        }
        Ok(key)
    }

    /// The two configured chains in stable (name-sorted) order.
    pub fn chain_pair(&self) -> anyhow::Result<((&str, &ChainConfig), (&str, &ChainConfig))> {
        let mut entries: Vec<_> = self.chains.iter().collect();
        if entries.len() != 2 {
            bail!(
                "exactly two [chains] entries are required, found {}",
                entries.len()
            );
        }
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Ok((
            (entries[0].0.as_str(), entries[0].1),
            (entries[1].0.as_str(), entries[1].1),
        ))
    }
}

fn validate_contract_address(address: &str) -> anyhow::Result<()> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("missing 0x prefix"))?;
    let bytes = hex::decode(hex_part).map_err(|e| anyhow!("not valid hex: {e}"))?;
    if bytes.len() != 20 {
        bail!("must be 20 bytes, found {}", bytes.len());
    }
    Ok(())
}

impl Default for RelayerConfig {
    fn default() -> Self {
        let mut chains = HashMap::new();

        chains.insert(
            "arbitrum-sepolia".to_string(),
            ChainConfig {
                chain_id: 421614,
                ws_endpoint: "wss://arbitrum-sepolia-rpc.publicnode.com".to_string(),
                contract_address: "0x0000000000000000000000000000000000000000".to_string(),
            },
        );

        chains.insert(
            "base-sepolia".to_string(),
            ChainConfig {
                chain_id: 84532,
                ws_endpoint: "wss://base-sepolia-rpc.publicnode.com".to_string(),
                contract_address: "0x0000000000000000000000000000000000000000".to_string(),
            },
        );

        Self {
            global: GlobalConfig {
                log_level: "info".to_string(),
                private_key: None,
            },
            chains,
            metrics: MetricsConfig {
                enabled: true,
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
        }
    }
}
