use crate::errors::BuildError;
use crate::operation::{OperationKind, OperationParams, OperationRequest};
use crate::registry::ContractRegistry;
use alloy::primitives::{Address, Bytes, U256};
use contracts::errors::ContractsError;
use contracts::utils::{parse_address, parse_bytes, parse_u256};
use contracts::{CreateProfileData, InitDataSchema, PostData};
use std::str::FromStr;

/// Turns loosely typed parameters into a validated `OperationRequest`.
///
/// Module fields accept a module name registered for the network or a raw
/// address. Building never touches the ledger.
pub struct CallBuilder<'a> {
    registry: &'a ContractRegistry,
    network: &'a str,
}

impl<'a> CallBuilder<'a> {
    pub fn new(registry: &'a ContractRegistry, network: &'a str) -> Self {
        Self { registry, network }
    }

    pub fn build(
        &self,
        kind: OperationKind,
        params: &OperationParams,
    ) -> Result<OperationRequest, BuildError> {
        for field in kind.required_fields() {
            required(params, field)?;
        }

        let request = match kind {
            OperationKind::CreateProfile => {
                OperationRequest::CreateProfile(CreateProfileData {
                    to: self.required_address(params, "to")?,
                    handle: required(params, "handle")?.to_string(),
                    imageURI: optional(params, "imageURI").unwrap_or_default().to_string(),
                    followModule: self.optional_module(params, "followModule")?,
                    followModuleInitData: self.init_data(params, "followModule", "followModuleInitData")?,
                    followNFTURI: optional(params, "followNFTURI").unwrap_or_default().to_string(),
                })
            }
            OperationKind::Post => OperationRequest::Post(PostData {
                profileId: required_u256(params, "profileId")?,
                contentURI: required(params, "contentURI")?.to_string(),
                collectModule: self.required_module(params, "collectModule")?,
                collectModuleInitData: self.init_data(params, "collectModule", "collectModuleInitData")?,
                referenceModule: self.optional_module(params, "referenceModule")?,
                referenceModuleInitData: self.init_data(
                    params,
                    "referenceModule",
                    "referenceModuleInitData",
                )?,
            }),
            OperationKind::WhitelistCollectModule => OperationRequest::WhitelistCollectModule {
                collect_module: self.required_module(params, "collectModule")?,
                whitelist: match optional(params, "whitelist") {
                    Some(value) => parse_bool(value, "whitelist")?,
                    None => true,
                },
            },
            OperationKind::Collect => OperationRequest::Collect {
                profile_id: required_u256(params, "profileId")?,
                pub_id: required_u256(params, "pubId")?,
                data: match optional(params, "data") {
                    Some(value) => parse_bytes(value).map_err(|e| encoding("data", e))?,
                    None => Bytes::new(),
                },
            },
            OperationKind::Follow => {
                let profile_ids = split_list(required(params, "profileIds")?)
                    .map(|value| parse_u256(value).map_err(|e| encoding("profileIds", e)))
                    .collect::<Result<Vec<U256>, BuildError>>()?;
                if profile_ids.iter().any(|id| id.is_zero()) {
                    return Err(BuildError::MissingField("profileIds".to_string()));
                }

                let datas = match optional(params, "datas") {
                    Some(value) => split_list(value)
                        .map(|data| parse_bytes(data).map_err(|e| encoding("datas", e)))
                        .collect::<Result<Vec<Bytes>, BuildError>>()?,
                    None => vec![Bytes::new(); profile_ids.len()],
                };
                if datas.len() != profile_ids.len() {
                    return Err(BuildError::Encoding {
                        field: "datas".to_string(),
                        reason: format!(
                            "{} entries for {} profile ids",
                            datas.len(),
                            profile_ids.len()
                        ),
                    });
                }

                OperationRequest::Follow { profile_ids, datas }
            }
            OperationKind::ApproveCurrency => OperationRequest::ApproveCurrency {
                currency: self.required_address(params, "currency")?,
                spender: self.required_module(params, "spender")?,
                amount: required_u256(params, "amount")?,
            },
        };

        return Ok(request);
    }

    fn required_address(&self, params: &OperationParams, field: &str) -> Result<Address, BuildError> {
        let address = parse_address(required(params, field)?).map_err(|e| encoding(field, e))?;
        if address.is_zero() {
            return Err(BuildError::MissingField(field.to_string()));
        }
        Ok(address)
    }

    fn required_module(&self, params: &OperationParams, field: &str) -> Result<Address, BuildError> {
        let address = self.module_address(required(params, field)?, field)?;
        if address.is_zero() {
            return Err(BuildError::MissingField(field.to_string()));
        }
        Ok(address)
    }

    fn optional_module(&self, params: &OperationParams, field: &str) -> Result<Address, BuildError> {
        match optional(params, field) {
            Some(value) => self.module_address(value, field),
            None => Ok(Address::ZERO),
        }
    }

    fn module_address(&self, value: &str, field: &str) -> Result<Address, BuildError> {
        if value.starts_with("0x") {
            return parse_address(value).map_err(|e| encoding(field, e));
        }

        self.registry
            .resolve(value, self.network)
            .map_err(|e| BuildError::Encoding {
                field: field.to_string(),
                reason: e.to_string(),
            })
    }

    /// Raw hex wins; otherwise the module's registered schema encodes the
    /// `<data_field>.<name>` entries. An unset module means empty data.
    fn init_data(
        &self,
        params: &OperationParams,
        module_field: &str,
        data_field: &str,
    ) -> Result<Bytes, BuildError> {
        let nested = params.nested(data_field);

        if let Some(raw) = optional(params, data_field) {
            if !nested.is_empty() {
                return Err(BuildError::Encoding {
                    field: data_field.to_string(),
                    reason: "raw init data and schema fields are mutually exclusive".to_string(),
                });
            }
            return parse_bytes(raw).map_err(|e| encoding(data_field, e));
        }

        let schema = match optional(params, &format!("{}Schema", module_field)) {
            Some(id) => Some(InitDataSchema::from_str(id).map_err(|e| encoding(data_field, e))?),
            None => self.registered_schema(params, module_field, data_field)?,
        };

        match schema {
            Some(schema) => schema.encode(&nested).map_err(|e| match e {
                ContractsError::MissingInitField(name) => {
                    BuildError::MissingField(format!("{}.{}", data_field, name))
                }
                ContractsError::InvalidInitField { field, reason } => BuildError::Encoding {
                    field: format!("{}.{}", data_field, field),
                    reason,
                },
                other => encoding(data_field, other),
            }),
            None if nested.is_empty() => Ok(Bytes::new()),
            None => Err(BuildError::Encoding {
                field: data_field.to_string(),
                reason: format!("no init data schema known for `{}`", module_field),
            }),
        }
    }

    fn registered_schema(
        &self,
        params: &OperationParams,
        module_field: &str,
        data_field: &str,
    ) -> Result<Option<InitDataSchema>, BuildError> {
        let Some(value) = optional(params, module_field) else {
            return Ok(None);
        };

        let module = if value.starts_with("0x") {
            let address = parse_address(value).map_err(|e| encoding(module_field, e))?;
            self.registry
                .module_by_address(address, self.network)
                .map(|(_, module)| module)
        } else {
            self.registry.module(value, self.network).ok()
        };

        match module {
            Some(module) => {
                let schema =
                    InitDataSchema::from_str(&module.schema).map_err(|e| encoding(data_field, e))?;
                Ok(Some(schema))
            }
            None => Ok(None),
        }
    }
}

fn optional<'p>(params: &'p OperationParams, field: &str) -> Option<&'p str> {
    params
        .get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required<'p>(params: &'p OperationParams, field: &str) -> Result<&'p str, BuildError> {
    optional(params, field).ok_or_else(|| BuildError::MissingField(field.to_string()))
}

fn required_u256(params: &OperationParams, field: &str) -> Result<U256, BuildError> {
    let value = parse_u256(required(params, field)?).map_err(|e| encoding(field, e))?;
    if value.is_zero() {
        return Err(BuildError::MissingField(field.to_string()));
    }
    Ok(value)
}

fn parse_bool(value: &str, field: &str) -> Result<bool, BuildError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(BuildError::Encoding {
            field: field.to_string(),
            reason: format!("`{}` is not a boolean", other),
        }),
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(|item| item.trim())
}

fn encoding(field: &str, err: impl ToString) -> BuildError {
    BuildError::Encoding {
        field: field.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModuleConfiguration, ModuleKind, NetworkConfiguration};
    use alloy::primitives::address;
    use std::collections::BTreeMap;

    const NETWORK: &str = "mumbai-sandbox";

    fn registry() -> ContractRegistry {
        let mut network = NetworkConfiguration::default();
        network.modules.insert(
            "free-collect".to_string(),
            ModuleConfiguration {
                address: address!("0BE6bD7092ee83D44a6eC1D949626FeE48caB30c"),
                kind: ModuleKind::Collect,
                schema: "free-collect-v1".to_string(),
            },
        );
        network.modules.insert(
            "nct-retire".to_string(),
            ModuleConfiguration {
                address: address!("e8C0BF8Cc8bDD7a764E81DF7490A30fbf0FC8E89"),
                kind: ModuleKind::Collect,
                schema: "fee-collect-v1".to_string(),
            },
        );

        let mut networks = BTreeMap::new();
        networks.insert(NETWORK.to_string(), network);
        ContractRegistry::new(networks)
    }

    #[test]
    fn free_collect_init_data_uses_the_registered_schema() {
        let registry = registry();
        let builder = CallBuilder::new(&registry, NETWORK);

        let params = OperationParams::new()
            .set("profileId", "34204")
            .set("contentURI", "ipfs://QmPost")
            .set("collectModule", "free-collect")
            .set("collectModuleInitData.followerOnly", "true");

        let OperationRequest::Post(vars) = builder.build(OperationKind::Post, &params).unwrap()
        else {
            panic!("expected a post request");
        };

        assert_eq!(vars.profileId, U256::from(34204));
        assert_eq!(vars.collectModule, address!("0BE6bD7092ee83D44a6eC1D949626FeE48caB30c"));
        assert_eq!(vars.referenceModule, Address::ZERO);
        assert!(vars.referenceModuleInitData.is_empty());

        let decoded = InitDataSchema::FreeCollectV1
            .decode(&vars.collectModuleInitData)
            .unwrap();
        assert_eq!(decoded[0].0, "followerOnly");
        assert_eq!(decoded[0].1.as_bool(), Some(true));
    }

    #[test]
    fn missing_fee_field_names_the_nested_field() {
        let registry = registry();
        let builder = CallBuilder::new(&registry, NETWORK);

        let params = OperationParams::new()
            .set("profileId", "1")
            .set("contentURI", "ipfs://QmPost")
            .set("collectModule", "nct-retire")
            .set("collectModuleInitData.currency", "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");

        let err = builder.build(OperationKind::Post, &params).unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingField("collectModuleInitData.amount".to_string())
        );
    }

    #[test]
    fn raw_init_data_is_used_verbatim() {
        let registry = registry();
        let builder = CallBuilder::new(&registry, NETWORK);

        let params = OperationParams::new()
            .set("profileId", "1")
            .set("contentURI", "ipfs://QmPost")
            .set("collectModule", "0x0BE6bD7092ee83D44a6eC1D949626FeE48caB30c")
            .set("collectModuleInitData", "0x0102");

        let OperationRequest::Post(vars) = builder.build(OperationKind::Post, &params).unwrap()
        else {
            panic!("expected a post request");
        };
        assert_eq!(vars.collectModuleInitData.to_vec(), vec![1, 2]);
    }

    #[test]
    fn zero_values_count_as_missing() {
        let registry = registry();
        let builder = CallBuilder::new(&registry, NETWORK);

        let params = OperationParams::new()
            .set("profileId", "0")
            .set("pubId", "1");
        assert_eq!(
            builder.build(OperationKind::Collect, &params).unwrap_err(),
            BuildError::MissingField("profileId".to_string())
        );

        let params = OperationParams::new()
            .set("to", "0x0000000000000000000000000000000000000000")
            .set("handle", "alice");
        assert_eq!(
            builder.build(OperationKind::CreateProfile, &params).unwrap_err(),
            BuildError::MissingField("to".to_string())
        );
    }

    #[test]
    fn unknown_module_name_is_an_encoding_error() {
        let registry = registry();
        let builder = CallBuilder::new(&registry, NETWORK);

        let params = OperationParams::new().set("collectModule", "fee-collect");
        let err = builder
            .build(OperationKind::WhitelistCollectModule, &params)
            .unwrap_err();
        assert!(matches!(err, BuildError::Encoding { ref field, .. } if field == "collectModule"));
    }

    #[test]
    fn follow_datas_default_to_one_empty_entry_per_profile() {
        let registry = registry();
        let builder = CallBuilder::new(&registry, NETWORK);

        let params = OperationParams::new().set("profileIds", "1, 0x2");
        let request = builder.build(OperationKind::Follow, &params).unwrap();
        assert_eq!(
            request,
            OperationRequest::Follow {
                profile_ids: vec![U256::from(1), U256::from(2)],
                datas: vec![Bytes::new(), Bytes::new()],
            }
        );

        let params = OperationParams::new()
            .set("profileIds", "1,2")
            .set("datas", "0x");
        assert!(matches!(
            builder.build(OperationKind::Follow, &params).unwrap_err(),
            BuildError::Encoding { ref field, .. } if field == "datas"
        ));
    }

    #[test]
    fn whitelist_defaults_to_true() {
        let registry = registry();
        let builder = CallBuilder::new(&registry, NETWORK);

        let params = OperationParams::new().set("collectModule", "nct-retire");
        let request = builder
            .build(OperationKind::WhitelistCollectModule, &params)
            .unwrap();
        assert_eq!(
            request,
            OperationRequest::WhitelistCollectModule {
                collect_module: address!("e8C0BF8Cc8bDD7a764E81DF7490A30fbf0FC8E89"),
                whitelist: true,
            }
        );
    }
}
