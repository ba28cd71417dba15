use crate::config::{ModuleConfiguration, NetworkConfiguration};
use crate::errors::LensCarbonError;
use alloy::primitives::Address;
use contracts::{ContractHandle, Ledger};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const HUB: &str = "hub";
pub const PROFILE_CREATION_PROXY: &str = "profile-creation-proxy";

/// Deployed addresses per network, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    networks: BTreeMap<String, NetworkConfiguration>,
}

impl ContractRegistry {
    pub fn new(networks: BTreeMap<String, NetworkConfiguration>) -> Self {
        Self { networks }
    }

    pub fn network(&self, network: &str) -> Result<&NetworkConfiguration, LensCarbonError> {
        self.networks.get(network).ok_or_else(|| {
            LensCarbonError::ConfigError(format!("network `{}` is not configured", network))
        })
    }

    pub fn resolve(&self, name: &str, network: &str) -> Result<Address, LensCarbonError> {
        self.networks
            .get(network)
            .and_then(|config| {
                config
                    .contracts
                    .get(name)
                    .copied()
                    .or_else(|| config.modules.get(name).map(|module| module.address))
            })
            .ok_or_else(|| LensCarbonError::UnknownContract {
                name: name.to_string(),
                network: network.to_string(),
            })
    }

    pub fn module(&self, name: &str, network: &str) -> Result<&ModuleConfiguration, LensCarbonError> {
        self.networks
            .get(network)
            .and_then(|config| config.modules.get(name))
            .ok_or_else(|| LensCarbonError::UnknownContract {
                name: name.to_string(),
                network: network.to_string(),
            })
    }

    pub fn module_by_address(
        &self,
        address: Address,
        network: &str,
    ) -> Option<(&str, &ModuleConfiguration)> {
        self.networks.get(network).and_then(|config| {
            config
                .modules
                .iter()
                .find(|(_, module)| module.address == address)
                .map(|(name, module)| (name.as_str(), module))
        })
    }

    pub fn bind<L: Ledger>(&self, address: Address, ledger: Arc<L>) -> ContractHandle<L> {
        ContractHandle::bind(address, ledger)
    }
}
