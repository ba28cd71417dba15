use crate::ContractsError;
use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{Bytes, U256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum basis points accepted by the hub's fee modules.
pub const BPS_MAX: u16 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub sol_type: &'static str,
    pub default: Option<&'static str>,
}

const FREE_COLLECT_V1_FIELDS: &[SchemaField] = &[SchemaField {
    name: "followerOnly",
    sol_type: "bool",
    default: Some("false"),
}];

const FEE_COLLECT_V1_FIELDS: &[SchemaField] = &[
    SchemaField {
        name: "amount",
        sol_type: "uint256",
        default: None,
    },
    SchemaField {
        name: "currency",
        sol_type: "address",
        default: None,
    },
    SchemaField {
        name: "recipient",
        sol_type: "address",
        default: None,
    },
    SchemaField {
        name: "referralFee",
        sol_type: "uint16",
        default: Some("0"),
    },
    SchemaField {
        name: "followerOnly",
        sol_type: "bool",
        default: Some("false"),
    },
];

/// Byte layout a module expects for its init data.
///
/// Modules are bound to a schema by id in the network configuration, so two
/// deployments of "the same" module can't silently disagree on layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitDataSchema {
    Empty,
    FreeCollectV1,
    FeeCollectV1,
}

impl InitDataSchema {
    pub fn id(&self) -> &'static str {
        match self {
            InitDataSchema::Empty => "empty-v1",
            InitDataSchema::FreeCollectV1 => "free-collect-v1",
            InitDataSchema::FeeCollectV1 => "fee-collect-v1",
        }
    }

    pub fn fields(&self) -> &'static [SchemaField] {
        match self {
            InitDataSchema::Empty => &[],
            InitDataSchema::FreeCollectV1 => FREE_COLLECT_V1_FIELDS,
            InitDataSchema::FeeCollectV1 => FEE_COLLECT_V1_FIELDS,
        }
    }

    fn tuple_type(&self) -> Result<DynSolType, ContractsError> {
        let mut types = Vec::with_capacity(self.fields().len());
        for field in self.fields() {
            let sol_type = DynSolType::parse(field.sol_type).map_err(|e| {
                ContractsError::InitDataMismatch {
                    schema: self.id().to_string(),
                    reason: e.to_string(),
                }
            })?;
            types.push(sol_type);
        }
        Ok(DynSolType::Tuple(types))
    }

    /// Encodes `values` (field name to literal) the way `defaultAbiCoder.encode`
    /// lays out function parameters. Absent fields take their default or fail.
    pub fn encode(&self, values: &BTreeMap<String, String>) -> Result<Bytes, ContractsError> {
        if let InitDataSchema::Empty = self {
            if let Some(field) = values.keys().next() {
                return Err(ContractsError::InvalidInitField {
                    field: field.clone(),
                    reason: format!("schema {} takes no fields", self.id()),
                });
            }
            return Ok(Bytes::new());
        }

        for key in values.keys() {
            if !self.fields().iter().any(|field| field.name == key) {
                return Err(ContractsError::InvalidInitField {
                    field: key.clone(),
                    reason: format!("not a field of schema {}", self.id()),
                });
            }
        }

        let mut tokens = Vec::with_capacity(self.fields().len());
        for field in self.fields() {
            let literal = match values.get(field.name) {
                Some(value) => value.trim(),
                None => field
                    .default
                    .ok_or_else(|| ContractsError::MissingInitField(field.name.to_string()))?,
            };

            let sol_type = DynSolType::parse(field.sol_type).map_err(|e| {
                ContractsError::InitDataMismatch {
                    schema: self.id().to_string(),
                    reason: e.to_string(),
                }
            })?;

            let token =
                sol_type
                    .coerce_str(literal)
                    .map_err(|e| ContractsError::InvalidInitField {
                        field: field.name.to_string(),
                        reason: e.to_string(),
                    })?;

            self.check_field(field, &token)?;
            tokens.push(token);
        }

        let encoded = DynSolValue::Tuple(tokens).abi_encode_params();
        return Ok(encoded.into());
    }

    /// Decodes init data produced for this schema into named values.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<(String, DynSolValue)>, ContractsError> {
        if let InitDataSchema::Empty = self {
            if !data.is_empty() {
                return Err(ContractsError::InitDataMismatch {
                    schema: self.id().to_string(),
                    reason: format!("expected no data, got {} bytes", data.len()),
                });
            }
            return Ok(Vec::new());
        }

        let value = self.tuple_type()?.abi_decode_params(data).map_err(|e| {
            ContractsError::InitDataMismatch {
                schema: self.id().to_string(),
                reason: e.to_string(),
            }
        })?;

        match value {
            DynSolValue::Tuple(items) => {
                if items.len() != self.fields().len() {
                    return Err(ContractsError::InitDataMismatch {
                        schema: self.id().to_string(),
                        reason: format!(
                            "Tuple length {} was expected, but got {}",
                            self.fields().len(),
                            items.len()
                        ),
                    });
                }

                let named = self
                    .fields()
                    .iter()
                    .map(|field| field.name.to_string())
                    .zip(items)
                    .collect();
                Ok(named)
            }
            other => Err(ContractsError::InitDataMismatch {
                schema: self.id().to_string(),
                reason: format!("Tuple was expected, but got {:?}", other),
            }),
        }
    }

    fn check_field(&self, field: &SchemaField, token: &DynSolValue) -> Result<(), ContractsError> {
        if let (InitDataSchema::FeeCollectV1, "referralFee", DynSolValue::Uint(value, _)) =
            (self, field.name, token)
        {
            if *value > U256::from(BPS_MAX) {
                return Err(ContractsError::InvalidInitField {
                    field: field.name.to_string(),
                    reason: format!("{} exceeds {} basis points", value, BPS_MAX),
                });
            }
        }
        Ok(())
    }
}

impl FromStr for InitDataSchema {
    type Err = ContractsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty-v1" => Ok(InitDataSchema::Empty),
            "free-collect-v1" => Ok(InitDataSchema::FreeCollectV1),
            "fee-collect-v1" => Ok(InitDataSchema::FeeCollectV1),
            other => Err(ContractsError::UnknownSchema(other.to_string())),
        }
    }
}

impl fmt::Display for InitDataSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use alloy::sol_types::SolValue;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn free_collect_matches_bool_encoding() {
        let encoded = InitDataSchema::FreeCollectV1
            .encode(&values(&[("followerOnly", "true")]))
            .unwrap();

        assert_eq!(encoded.to_vec(), true.abi_encode());
    }

    #[test]
    fn fee_collect_matches_tuple_encoding() {
        let currency = address!("7beCBA11618Ca63Ead5605DE235f6dD3b25c530E");
        let recipient = address!("00000000000000000000000000000000000000aa");

        let encoded = InitDataSchema::FeeCollectV1
            .encode(&values(&[
                ("amount", "100000000000000"),
                ("currency", "0x7beCBA11618Ca63Ead5605DE235f6dD3b25c530E"),
                ("recipient", "0x00000000000000000000000000000000000000aa"),
            ]))
            .unwrap();

        let expected = (
            U256::from(100_000_000_000_000u64),
            currency,
            recipient,
            0u16,
            false,
        )
            .abi_encode_params();
        assert_eq!(encoded.to_vec(), expected);

        let decoded = InitDataSchema::FeeCollectV1.decode(&encoded).unwrap();
        assert_eq!(decoded.len(), 5);
        assert_eq!(decoded[1].0, "currency");
        assert_eq!(decoded[1].1, DynSolValue::Address(currency));
        assert_eq!(decoded[4].1, DynSolValue::Bool(false));
    }

    #[test]
    fn fee_collect_requires_amount() {
        let err = InitDataSchema::FeeCollectV1
            .encode(&values(&[
                ("currency", "0x7beCBA11618Ca63Ead5605DE235f6dD3b25c530E"),
                ("recipient", "0x00000000000000000000000000000000000000aa"),
            ]))
            .unwrap_err();

        assert!(matches!(err, ContractsError::MissingInitField(field) if field == "amount"));
    }

    #[test]
    fn referral_fee_above_bps_max_is_rejected() {
        let err = InitDataSchema::FeeCollectV1
            .encode(&values(&[
                ("amount", "1"),
                ("currency", "0x7beCBA11618Ca63Ead5605DE235f6dD3b25c530E"),
                ("recipient", "0x00000000000000000000000000000000000000aa"),
                ("referralFee", "10001"),
            ]))
            .unwrap_err();

        assert!(matches!(err, ContractsError::InvalidInitField { field, .. } if field == "referralFee"));
    }

    #[test]
    fn unknown_field_and_bad_literal_are_rejected() {
        let err = InitDataSchema::FreeCollectV1
            .encode(&values(&[("followersOnly", "true")]))
            .unwrap_err();
        assert!(matches!(err, ContractsError::InvalidInitField { .. }));

        let err = InitDataSchema::FreeCollectV1
            .encode(&values(&[("followerOnly", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ContractsError::InvalidInitField { .. }));
    }

    #[test]
    fn bool_payload_does_not_decode_as_fee_tuple() {
        // The five-field layout needs 160 bytes; a single bool word is too short.
        let err = InitDataSchema::FeeCollectV1
            .decode(&true.abi_encode())
            .unwrap_err();
        assert!(matches!(err, ContractsError::InitDataMismatch { .. }));
    }

    #[test]
    fn empty_schema_round_trip() {
        assert!(InitDataSchema::Empty.encode(&BTreeMap::new()).unwrap().is_empty());
        assert!(InitDataSchema::Empty.decode(&[]).unwrap().is_empty());
        assert_eq!(
            "fee-collect-v1".parse::<InitDataSchema>().unwrap(),
            InitDataSchema::FeeCollectV1
        );
        assert!("fee-collect-v2".parse::<InitDataSchema>().is_err());
    }
}
