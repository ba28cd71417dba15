use crate::errors::LensCarbonError;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use contracts::Receipt;
use contracts::call_data_builder::CallDataBuilder;
use contracts::{CreateProfileData, PostData};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    CreateProfile,
    Post,
    WhitelistCollectModule,
    Collect,
    Follow,
    ApproveCurrency,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::CreateProfile,
        OperationKind::Post,
        OperationKind::WhitelistCollectModule,
        OperationKind::Collect,
        OperationKind::Follow,
        OperationKind::ApproveCurrency,
    ];

    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            OperationKind::CreateProfile => &["to", "handle"],
            OperationKind::Post => &["profileId", "contentURI", "collectModule"],
            OperationKind::WhitelistCollectModule => &["collectModule"],
            OperationKind::Collect => &["profileId", "pubId"],
            OperationKind::Follow => &["profileIds"],
            OperationKind::ApproveCurrency => &["currency", "spender", "amount"],
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::CreateProfile => "create-profile",
            OperationKind::Post => "post",
            OperationKind::WhitelistCollectModule => "whitelist-collect-module",
            OperationKind::Collect => "collect",
            OperationKind::Follow => "follow",
            OperationKind::ApproveCurrency => "approve-currency",
        };
        f.write_str(name)
    }
}

/// User-supplied parameters keyed by the protocol's field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationParams {
    values: BTreeMap<String, String>,
}

impl OperationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.values.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(|value| value.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Fields nested under `prefix.`, with the prefix stripped.
    pub fn nested(&self, prefix: &str) -> BTreeMap<String, String> {
        let prefix = format!("{}.", prefix);
        self.values
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|field| (field.to_string(), value.clone()))
            })
            .collect()
    }
}

/// Which registry entry (or raw address) a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    Named(&'static str),
    Address(Address),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    CreateProfile(CreateProfileData),
    Post(PostData),
    WhitelistCollectModule {
        collect_module: Address,
        whitelist: bool,
    },
    Collect {
        profile_id: U256,
        pub_id: U256,
        data: Bytes,
    },
    Follow {
        profile_ids: Vec<U256>,
        datas: Vec<Bytes>,
    },
    ApproveCurrency {
        currency: Address,
        spender: Address,
        amount: U256,
    },
}

impl OperationRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRequest::CreateProfile(_) => OperationKind::CreateProfile,
            OperationRequest::Post(_) => OperationKind::Post,
            OperationRequest::WhitelistCollectModule { .. } => OperationKind::WhitelistCollectModule,
            OperationRequest::Collect { .. } => OperationKind::Collect,
            OperationRequest::Follow { .. } => OperationKind::Follow,
            OperationRequest::ApproveCurrency { .. } => OperationKind::ApproveCurrency,
        }
    }

    pub fn target(&self) -> CallTarget {
        match self {
            OperationRequest::CreateProfile(_) => {
                CallTarget::Named(crate::registry::PROFILE_CREATION_PROXY)
            }
            OperationRequest::ApproveCurrency { currency, .. } => CallTarget::Address(*currency),
            _ => CallTarget::Named(crate::registry::HUB),
        }
    }

    pub fn call_data(&self) -> Bytes {
        let builder = CallDataBuilder::new();
        match self.clone() {
            OperationRequest::CreateProfile(vars) => builder.build_create_profile_call_data(vars),
            OperationRequest::Post(vars) => builder.build_post_call_data(vars),
            OperationRequest::WhitelistCollectModule {
                collect_module,
                whitelist,
            } => builder.build_whitelist_collect_module_call_data(collect_module, whitelist),
            OperationRequest::Collect {
                profile_id,
                pub_id,
                data,
            } => builder.build_collect_call_data(profile_id, pub_id, data),
            OperationRequest::Follow { profile_ids, datas } => {
                builder.build_follow_call_data(profile_ids, datas)
            }
            OperationRequest::ApproveCurrency { spender, amount, .. } => {
                builder.build_approve_call_data(spender, amount)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub block_number: u64,
    pub gas_used: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Confirmed(Receipt),
    Failed(FailureRecord),
}

/// What came back from one broadcast. Never mutated after `submit` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    kind: OperationKind,
    target: Address,
    tx_hash: TxHash,
    outcome: SubmissionOutcome,
}

impl SubmissionResult {
    pub fn new(
        kind: OperationKind,
        target: Address,
        tx_hash: TxHash,
        outcome: SubmissionOutcome,
    ) -> Self {
        Self {
            kind,
            target,
            tx_hash,
            outcome,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, SubmissionOutcome::Confirmed(_))
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn outcome(&self) -> &SubmissionOutcome {
        &self.outcome
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match &self.outcome {
            SubmissionOutcome::Confirmed(receipt) => Some(receipt),
            SubmissionOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    pub assertion: String,
    pub expected: String,
    pub observed: String,
    pub matched: bool,
}

impl VerificationOutcome {
    pub fn new(assertion: String, expected: String, observed: String) -> Self {
        let matched = expected == observed;
        Self {
            assertion,
            expected,
            observed,
            matched,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationState {
    Built,
    Submitted,
    Confirmed,
    Failed,
    Verified,
}

impl OperationState {
    pub fn can_transition_to(&self, next: OperationState) -> bool {
        matches!(
            (self, next),
            (OperationState::Built, OperationState::Submitted)
                | (OperationState::Submitted, OperationState::Confirmed)
                | (OperationState::Submitted, OperationState::Failed)
                | (OperationState::Confirmed, OperationState::Verified)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Failed | OperationState::Verified)
    }
}

#[derive(Debug, Clone)]
pub struct Lifecycle {
    kind: OperationKind,
    state: OperationState,
}

impl Lifecycle {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            state: OperationState::Built,
        }
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    pub fn advance(&mut self, next: OperationState) -> Result<(), LensCarbonError> {
        if !self.state.can_transition_to(next) {
            return Err(LensCarbonError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(operation = %self.kind, from = ?self.state, to = ?next, "operation state changed");
        self.state = next;
        Ok(())
    }
}

/// The record of one build → submit → verify chain.
#[derive(Debug, Clone)]
pub struct OperationReport {
    pub state: OperationState,
    pub submission: SubmissionResult,
    pub verification: Option<VerificationOutcome>,
}
