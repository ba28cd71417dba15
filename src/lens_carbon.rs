use crate::builder::CallBuilder;
use crate::config::{Identity, LensCarbonConfiguration, NetworkConfiguration};
use crate::errors::{LensCarbonError, SubmissionError};
use crate::gas::GasOverrides;
use crate::operation::{
    CallTarget, Lifecycle, OperationKind, OperationParams, OperationReport, OperationRequest,
    OperationState, SubmissionOutcome, VerificationOutcome,
};
use crate::registry::{ContractRegistry, HUB};
use crate::submit::Submitter;
use crate::verify::{Assertion, Verifier};
use alloy::primitives::{Address, U256};
use api::GatewayProvider;
use api::types::publication_metadata::PublicationMetadata;
use contracts::contract::lens_hub::LensHubContract;
use contracts::utils::load_signer;
use contracts::{AlloyLedger, ContractHandle, Ledger, PublicationStruct};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs build, submit and verify for one network and one signing identity.
pub struct LensCarbon<L: Ledger> {
    network: String,
    registry: ContractRegistry,
    ledger: Arc<L>,
    submitter: Submitter,
    verifier: Verifier,
    gateway: GatewayProvider,
}

impl LensCarbon<AlloyLedger> {
    /// Loads the identity's key from the environment and connects to the
    /// network's RPC endpoint. Fails if the endpoint serves another chain.
    pub async fn connect(
        config: LensCarbonConfiguration,
        network: &str,
        identity: Identity,
        cancel: &CancellationToken,
    ) -> Result<Self, LensCarbonError> {
        let rpc_url = config.network(network)?.resolve_rpc_url()?;
        let key = config.identities.load_key(identity)?;
        let signer = load_signer(key.expose())?;

        let ledger = AlloyLedger::connect(&rpc_url, signer)?;
        let lens = Self::with_ledger(config, network, Arc::new(ledger))?;
        lens.ensure_chain(cancel).await?;
        info!(network, %identity, sender = %lens.sender(), "connected");

        return Ok(lens);
    }
}

impl<L: Ledger> LensCarbon<L> {
    pub fn with_ledger(
        config: LensCarbonConfiguration,
        network: &str,
        ledger: Arc<L>,
    ) -> Result<Self, LensCarbonError> {
        config.network(network)?;

        let gateway = GatewayProvider::with_timeout(
            &config.gateways.ipfs,
            &config.gateways.arweave,
            config.submission.read_timeout(),
        )?;

        return Ok(Self {
            network: network.to_string(),
            submitter: Submitter::from_config(&config.submission),
            verifier: Verifier::new(config.submission.read_timeout()),
            registry: ContractRegistry::new(config.networks),
            ledger,
            gateway,
        });
    }

    /// Compares the endpoint's chain id with the configured `chain_id`.
    /// Networks without a configured id are not checked.
    pub async fn ensure_chain(&self, cancel: &CancellationToken) -> Result<(), LensCarbonError> {
        let Some(expected) = self.network()?.chain_id else {
            return Ok(());
        };

        let reported = self.verifier.bounded(self.ledger.chain_id(), cancel).await?;
        if reported != expected {
            return Err(LensCarbonError::ConfigError(format!(
                "network `{}` is chain {}, but the RPC endpoint serves chain {}",
                self.network, expected, reported
            )));
        }

        Ok(())
    }

    pub fn sender(&self) -> Address {
        self.ledger.sender()
    }

    pub fn network(&self) -> Result<&NetworkConfiguration, LensCarbonError> {
        self.registry.network(&self.network)
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn hub(&self) -> Result<ContractHandle<L>, LensCarbonError> {
        let address = self.registry.resolve(HUB, &self.network)?;
        Ok(self.registry.bind(address, self.ledger.clone()))
    }

    pub fn handle_for(&self, request: &OperationRequest) -> Result<ContractHandle<L>, LensCarbonError> {
        let address = match request.target() {
            CallTarget::Named(name) => self.registry.resolve(name, &self.network)?,
            CallTarget::Address(address) => address,
        };
        Ok(self.registry.bind(address, self.ledger.clone()))
    }

    pub fn build(
        &self,
        kind: OperationKind,
        params: &OperationParams,
    ) -> Result<OperationRequest, LensCarbonError> {
        let request = CallBuilder::new(&self.registry, &self.network).build(kind, params)?;
        Ok(request)
    }

    /// Submits `request` and, once confirmed, checks `assertion`.
    ///
    /// A transaction mined with a failed status is an error. A mismatched
    /// assertion is not: it is logged and returned in the report. A read
    /// failure after confirmation is `Unverified` and keeps the tx hash.
    pub async fn execute(
        &self,
        request: OperationRequest,
        assertion: Option<Assertion>,
        overrides: &GasOverrides,
        cancel: &CancellationToken,
    ) -> Result<OperationReport, LensCarbonError> {
        let mut lifecycle = Lifecycle::new(request.kind());
        let handle = self.handle_for(&request)?;

        let submission = self
            .submitter
            .submit(&handle, &request, overrides, cancel)
            .await?;
        lifecycle.advance(OperationState::Submitted)?;

        if let SubmissionOutcome::Failed(failure) = submission.outcome() {
            lifecycle.advance(OperationState::Failed)?;
            return Err(SubmissionError::Reverted {
                tx_hash: submission.tx_hash(),
                block_number: failure.block_number,
            }
            .into());
        }
        lifecycle.advance(OperationState::Confirmed)?;

        let verification = match assertion {
            Some(assertion) => {
                let outcome = self
                    .verifier
                    .verify(&self.hub()?, &assertion, cancel)
                    .await
                    .map_err(|source| LensCarbonError::Unverified {
                        tx_hash: submission.tx_hash(),
                        source,
                    })?;
                lifecycle.advance(OperationState::Verified)?;
                if !outcome.matched {
                    warn!(
                        operation = %request.kind(),
                        tx_hash = %submission.tx_hash(),
                        "confirmed, but the expected state is not visible yet"
                    );
                }
                Some(outcome)
            }
            None => None,
        };

        return Ok(OperationReport {
            state: lifecycle.state(),
            submission,
            verification,
        });
    }

    pub async fn verify(
        &self,
        assertion: &Assertion,
        cancel: &CancellationToken,
    ) -> Result<VerificationOutcome, LensCarbonError> {
        let outcome = self.verifier.verify(&self.hub()?, assertion, cancel).await?;
        Ok(outcome)
    }

    pub async fn create_profile(
        &self,
        params: &OperationParams,
        overrides: &GasOverrides,
        cancel: &CancellationToken,
    ) -> Result<OperationReport, LensCarbonError> {
        let request = self.build(OperationKind::CreateProfile, params)?;
        let assertion = match &request {
            OperationRequest::CreateProfile(vars) => Some(Assertion::ProfileOwner {
                handle: self.network()?.full_handle(&vars.handle),
                expected_owner: vars.to,
            }),
            _ => None,
        };

        self.execute(request, assertion, overrides, cancel).await
    }

    pub async fn post(
        &self,
        params: &OperationParams,
        overrides: &GasOverrides,
        cancel: &CancellationToken,
    ) -> Result<OperationReport, LensCarbonError> {
        let request = self.build(OperationKind::Post, params)?;
        let assertion = match &request {
            OperationRequest::Post(vars) => Some(Assertion::LatestPublication {
                profile_id: vars.profileId,
                expected_content_uri: vars.contentURI.clone(),
                expected_collect_module: vars.collectModule,
            }),
            _ => None,
        };

        self.execute(request, assertion, overrides, cancel).await
    }

    pub async fn whitelist_collect_module(
        &self,
        params: &OperationParams,
        overrides: &GasOverrides,
        cancel: &CancellationToken,
    ) -> Result<OperationReport, LensCarbonError> {
        let request = self.build(OperationKind::WhitelistCollectModule, params)?;
        let assertion = match &request {
            OperationRequest::WhitelistCollectModule {
                collect_module,
                whitelist,
            } => Some(Assertion::CollectModuleWhitelisted {
                module: *collect_module,
                expected: *whitelist,
            }),
            _ => None,
        };

        self.execute(request, assertion, overrides, cancel).await
    }

    pub async fn collect(
        &self,
        params: &OperationParams,
        overrides: &GasOverrides,
        cancel: &CancellationToken,
    ) -> Result<OperationReport, LensCarbonError> {
        let request = self.build(OperationKind::Collect, params)?;
        let assertion = match &request {
            OperationRequest::Collect {
                profile_id, pub_id, ..
            } => Some(Assertion::CollectNftOwner {
                profile_id: *profile_id,
                pub_id: *pub_id,
                token_id: None,
                expected_owner: self.sender(),
            }),
            _ => None,
        };

        self.execute(request, assertion, overrides, cancel).await
    }

    pub async fn follow(
        &self,
        params: &OperationParams,
        overrides: &GasOverrides,
        cancel: &CancellationToken,
    ) -> Result<OperationReport, LensCarbonError> {
        let request = self.build(OperationKind::Follow, params)?;
        let assertion = match &request {
            OperationRequest::Follow { profile_ids, .. } => {
                profile_ids.first().map(|profile_id| Assertion::FollowNftHeld {
                    profile_id: *profile_id,
                    follower: self.sender(),
                })
            }
            _ => None,
        };

        self.execute(request, assertion, overrides, cancel).await
    }

    pub async fn approve_currency(
        &self,
        params: &OperationParams,
        overrides: &GasOverrides,
        cancel: &CancellationToken,
    ) -> Result<OperationReport, LensCarbonError> {
        let request = self.build(OperationKind::ApproveCurrency, params)?;
        let assertion = match &request {
            OperationRequest::ApproveCurrency {
                currency,
                spender,
                amount,
            } => Some(Assertion::AllowanceAtLeast {
                currency: *currency,
                owner: self.sender(),
                spender: *spender,
                amount: *amount,
            }),
            _ => None,
        };

        self.execute(request, assertion, overrides, cancel).await
    }

    /// `None` when no profile is registered under the handle.
    pub async fn profile_id_by_handle(
        &self,
        handle: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<U256>, LensCarbonError> {
        let handle = self.network()?.full_handle(handle);
        let lens_hub = LensHubContract::new(self.hub()?);

        let id = self
            .verifier
            .bounded(lens_hub.get_profile_id_by_handle(&handle), cancel)
            .await?;
        Ok(if id.is_zero() { None } else { Some(id) })
    }

    pub async fn profile_owner(
        &self,
        profile_id: U256,
        cancel: &CancellationToken,
    ) -> Result<Address, LensCarbonError> {
        let lens_hub = LensHubContract::new(self.hub()?);
        let owner = self
            .verifier
            .bounded(lens_hub.owner_of(profile_id), cancel)
            .await?;
        Ok(owner)
    }

    pub async fn publication(
        &self,
        profile_id: U256,
        pub_id: U256,
        cancel: &CancellationToken,
    ) -> Result<PublicationStruct, LensCarbonError> {
        let lens_hub = LensHubContract::new(self.hub()?);
        let publication = self
            .verifier
            .bounded(lens_hub.get_pub(profile_id, pub_id), cancel)
            .await?;
        Ok(publication)
    }

    /// Reads the publication's content URI and fetches the document behind it.
    pub async fn publication_metadata(
        &self,
        profile_id: U256,
        pub_id: U256,
        cancel: &CancellationToken,
    ) -> Result<PublicationMetadata, LensCarbonError> {
        let lens_hub = LensHubContract::new(self.hub()?);
        let content_uri = self
            .verifier
            .bounded(lens_hub.get_content_uri(profile_id, pub_id), cancel)
            .await?;

        let metadata = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(crate::errors::ReadError::Cancelled.into()),
            metadata = self.gateway.get_publication_metadata(&content_uri) => metadata?,
        };
        Ok(metadata)
    }
}
