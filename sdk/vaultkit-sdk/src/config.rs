//! Client configuration.
//!
//! Defaults mirror the behaviour the vault UI was tuned for: poll every two
//! seconds, retry failed reads twice, wait 1.5s after confirmation before
//! refetching.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::core::constants::{
    DEFAULT_CONFIRM_POLL_INTERVAL_MS, DEFAULT_CONFIRM_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_READ_RETRIES, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_SETTLE_DELAY_MS,
};
use crate::error::{Result, VaultSdkError};

/// Ledger cluster the client talks to.
///
/// Serialized through its `Display`/`FromStr` names, so config files accept
/// the same spellings as `VAULT_CLUSTER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Cluster {
    Mainnet,
    #[default]
    Devnet,
    Testnet,
    Localnet,
    /// A named or URL-identified cluster
    Custom(String),
}

impl Cluster {
    pub fn default_rpc_url(&self) -> String {
        match self {
            Self::Mainnet => "https://api.mainnet-beta.solana.com".to_string(),
            Self::Devnet => "https://api.devnet.solana.com".to_string(),
            Self::Testnet => "https://api.testnet.solana.com".to_string(),
            Self::Localnet => "http://127.0.0.1:8899".to_string(),
            Self::Custom(url) => url.clone(),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => f.write_str("mainnet-beta"),
            Self::Devnet => f.write_str("devnet"),
            Self::Testnet => f.write_str("testnet"),
            Self::Localnet => f.write_str("localnet"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

impl FromStr for Cluster {
    type Err = VaultSdkError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Err(VaultSdkError::Config("empty cluster name".to_string())),
            "mainnet" | "mainnet-beta" => Ok(Self::Mainnet),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "localnet" | "localhost" => Ok(Self::Localnet),
            _ => Ok(Self::Custom(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for Cluster {
    type Error = VaultSdkError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<Cluster> for String {
    fn from(cluster: Cluster) -> Self {
        cluster.to_string()
    }
}

/// Vault client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub cluster: Cluster,

    /// RPC endpoint; falls back to the cluster default
    pub rpc_url: Option<String>,

    #[serde(with = "pubkey_string")]
    pub program_id: Pubkey,

    pub poll_interval_ms: u64,

    /// Extra attempts after a failed read
    pub read_retries: u32,

    /// Backoff before the first retry, doubled for each further one
    pub retry_base_delay_ms: u64,

    /// Delay between confirmation and cache invalidation
    pub settle_delay_ms: u64,

    pub confirm_timeout_ms: u64,

    pub confirm_poll_interval_ms: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::default(),
            rpc_url: None,
            program_id: vaultkit_interface::ID,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            read_retries: DEFAULT_READ_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            confirm_timeout_ms: DEFAULT_CONFIRM_TIMEOUT_MS,
            confirm_poll_interval_ms: DEFAULT_CONFIRM_POLL_INTERVAL_MS,
        }
    }
}

impl VaultConfig {
    pub fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            ..Self::default()
        }
    }

    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = Some(rpc_url.into());
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| VaultSdkError::Config(e.to_string()))
    }

    /// Load from `VAULT_CLUSTER`, `RPC_URL`, `PROGRAM_ID`,
    /// `VAULT_POLL_INTERVAL_MS` and `VAULT_SETTLE_DELAY_MS` over the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(cluster) = env::var("VAULT_CLUSTER") {
            config.cluster = cluster.parse()?;
        }
        if let Ok(url) = env::var("RPC_URL") {
            config.rpc_url = Some(url);
        }
        if let Ok(program_id) = env::var("PROGRAM_ID") {
            config.program_id = Pubkey::from_str(program_id.trim())
                .map_err(|e| VaultSdkError::Config(format!("PROGRAM_ID: {}", e)))?;
        }
        if let Ok(ms) = env::var("VAULT_POLL_INTERVAL_MS") {
            config.poll_interval_ms = parse_millis("VAULT_POLL_INTERVAL_MS", &ms)?;
        }
        if let Ok(ms) = env::var("VAULT_SETTLE_DELAY_MS") {
            config.settle_delay_ms = parse_millis("VAULT_SETTLE_DELAY_MS", &ms)?;
        }

        Ok(config)
    }

    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.cluster.default_rpc_url())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn confirm_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirm_poll_interval_ms)
    }
}

fn parse_millis(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| VaultSdkError::Config(format!("{}: {}", name, e)))
}

mod pubkey_string {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VaultConfig::default();
        assert_eq!(config.cluster, Cluster::Devnet);
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
        assert_eq!(config.settle_delay(), Duration::from_millis(1500));
        assert_eq!(config.read_retries, 2);
        assert_eq!(config.program_id, vaultkit_interface::ID);
        assert_eq!(config.rpc_url(), "https://api.devnet.solana.com");
    }

    #[test]
    fn test_cluster_parsing() {
        assert_eq!("mainnet-beta".parse::<Cluster>().unwrap(), Cluster::Mainnet);
        assert_eq!("Devnet".parse::<Cluster>().unwrap(), Cluster::Devnet);
        assert_eq!("localhost".parse::<Cluster>().unwrap(), Cluster::Localnet);
        assert_eq!(
            "http://10.0.0.5:8899".parse::<Cluster>().unwrap(),
            Cluster::Custom("http://10.0.0.5:8899".to_string())
        );
        assert!("  ".parse::<Cluster>().is_err());
        assert_eq!(Cluster::Mainnet.to_string(), "mainnet-beta");
    }

    #[test]
    fn test_from_json_partial() {
        let program_id = Pubkey::new_unique();
        let json = format!(
            r#"{{"cluster":"localnet","program_id":"{}","settle_delay_ms":250}}"#,
            program_id
        );
        let config = VaultConfig::from_json(&json).unwrap();
        assert_eq!(config.cluster, Cluster::Localnet);
        assert_eq!(config.program_id, program_id);
        assert_eq!(config.settle_delay(), Duration::from_millis(250));
        // Untouched fields keep their defaults
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.rpc_url(), "http://127.0.0.1:8899");
    }

    #[test]
    fn test_from_json_accepts_cluster_aliases() {
        for (name, cluster) in [
            ("mainnet-beta", Cluster::Mainnet),
            ("mainnet", Cluster::Mainnet),
            ("Devnet", Cluster::Devnet),
            ("localhost", Cluster::Localnet),
        ] {
            let json = format!(r#"{{"cluster":"{}"}}"#, name);
            assert_eq!(VaultConfig::from_json(&json).unwrap().cluster, cluster);
        }
        assert!(matches!(
            VaultConfig::from_json(r#"{"cluster":" "}"#),
            Err(VaultSdkError::Config(_))
        ));
    }

    #[test]
    fn test_cluster_serializes_display_name() {
        let json = serde_json::to_string(&VaultConfig::new(Cluster::Mainnet)).unwrap();
        assert!(json.contains(r#""cluster":"mainnet-beta""#), "{}", json);
        assert_eq!(VaultConfig::from_json(&json).unwrap().cluster, Cluster::Mainnet);
    }

    #[test]
    fn test_from_json_rejects_bad_program_id() {
        let err = VaultConfig::from_json(r#"{"program_id":"not-a-key"}"#).unwrap_err();
        assert!(matches!(err, VaultSdkError::Config(_)));
    }

    #[test]
    fn test_json_round_trip_keeps_custom_cluster() {
        let config = VaultConfig::new(Cluster::Custom("staging".into()))
            .with_rpc_url("http://staging:8899");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(VaultConfig::from_json(&json).unwrap(), config);
    }
}
