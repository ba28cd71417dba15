use crate::errors::LensCarbonError;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "LENS_CARBON_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Collect,
    Follow,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfiguration {
    pub address: Address,
    pub kind: ModuleKind,
    /// Init-data schema id, e.g. `fee-collect-v1`.
    pub schema: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub rpc_url_env: Option<String>,
    /// Suffix the hub appends to registered handles (`.test` on the sandbox).
    #[serde(default)]
    pub handle_suffix: Option<String>,
    #[serde(default)]
    pub contracts: BTreeMap<String, Address>,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleConfiguration>,
}

impl NetworkConfiguration {
    /// The RPC URL from `rpc_url_env` when that variable is set, else `rpc_url`.
    pub fn resolve_rpc_url(&self) -> Result<String, LensCarbonError> {
        if let Some(env) = &self.rpc_url_env {
            if let Ok(url) = std::env::var(env) {
                if !url.trim().is_empty() {
                    return Ok(url);
                }
            }
        }

        self.rpc_url.clone().ok_or_else(|| {
            LensCarbonError::ConfigError(match &self.rpc_url_env {
                Some(env) => format!("neither `{}` nor `rpc_url` is set", env),
                None => "`rpc_url` is not set".to_string(),
            })
        })
    }

    pub fn full_handle(&self, handle: &str) -> String {
        match &self.handle_suffix {
            Some(suffix) if !handle.ends_with(suffix.as_str()) => format!("{}{}", handle, suffix),
            _ => handle.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfiguration {
    /// Fixed gas limit; when unset the node estimate plus headroom is used.
    pub limit: Option<u64>,
    pub headroom_percent: u64,
    /// Upper bound on any gas limit, estimated or fixed.
    pub ceiling: Option<u64>,
    pub price_wei: Option<u128>,
}

impl Default for GasConfiguration {
    fn default() -> Self {
        Self {
            limit: None,
            headroom_percent: 20,
            ceiling: None,
            price_wei: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfiguration {
    pub confirmation_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub read_timeout_secs: u64,
    pub gas: GasConfiguration,
}

impl Default for SubmissionConfiguration {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 180,
            poll_interval_ms: 2_000,
            read_timeout_secs: 30,
            gas: GasConfiguration::default(),
        }
    }
}

impl SubmissionConfiguration {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Identity {
    User,
    Collector,
    Governance,
}

impl FromStr for Identity {
    type Err = LensCarbonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Identity::User),
            "collector" => Ok(Identity::Collector),
            "governance" => Ok(Identity::Governance),
            other => Err(LensCarbonError::ConfigError(format!(
                "unknown identity `{}`",
                other
            ))),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::User => f.write_str("user"),
            Identity::Collector => f.write_str("collector"),
            Identity::Governance => f.write_str("governance"),
        }
    }
}

/// Names of the environment variables holding each identity's private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitiesConfiguration {
    pub user: String,
    pub collector: String,
    pub governance: String,
}

impl Default for IdentitiesConfiguration {
    fn default() -> Self {
        Self {
            user: "USER_PRIVATE_KEY".to_string(),
            collector: "COLLECTOR_PRIVATE_KEY".to_string(),
            governance: "GOVERNANCE_PRIVATE_KEY".to_string(),
        }
    }
}

impl IdentitiesConfiguration {
    pub fn env_var(&self, identity: Identity) -> &str {
        match identity {
            Identity::User => &self.user,
            Identity::Collector => &self.collector,
            Identity::Governance => &self.governance,
        }
    }

    pub fn load_key(&self, identity: Identity) -> Result<SecretKey, LensCarbonError> {
        let env = self.env_var(identity);
        match std::env::var(env) {
            Ok(value) if !value.trim().is_empty() => Ok(SecretKey(value)),
            _ => Err(LensCarbonError::MissingIdentity(env.to_string())),
        }
    }
}

/// Private key material; `Debug` never prints it.
#[derive(Clone)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfiguration {
    pub ipfs: String,
    pub arweave: String,
}

impl Default for GatewayConfiguration {
    fn default() -> Self {
        Self {
            ipfs: "https://lens.infura-ipfs.io".to_string(),
            arweave: "https://arweave.net".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LensCarbonConfiguration {
    pub networks: BTreeMap<String, NetworkConfiguration>,
    #[serde(default)]
    pub submission: SubmissionConfiguration,
    #[serde(default)]
    pub identities: IdentitiesConfiguration,
    #[serde(default)]
    pub gateways: GatewayConfiguration,
}

impl LensCarbonConfiguration {
    pub fn from_json_str(json: &str) -> Result<Self, LensCarbonError> {
        let config: LensCarbonConfiguration = serde_json::from_str(json)?;
        return Ok(config);
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LensCarbonError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn network(&self, name: &str) -> Result<&NetworkConfiguration, LensCarbonError> {
        self.networks.get(name).ok_or_else(|| {
            LensCarbonError::ConfigError(format!("network `{}` is not configured", name))
        })
    }
}
