use crate::errors::ReadError;
use crate::operation::VerificationOutcome;
use alloy::primitives::{Address, U256};
use contracts::contract::collect_nft::CollectNftContract;
use contracts::contract::erc20::Erc20Contract;
use contracts::contract::follow_nft::FollowNftContract;
use contracts::contract::lens_hub::LensHubContract;
use contracts::{ContractHandle, ContractsError, Ledger};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// An expected fact about protocol state after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    /// The handle resolves to a profile owned by `expected_owner`.
    ProfileOwner {
        handle: String,
        expected_owner: Address,
    },
    /// The profile's newest publication points at this content and module.
    LatestPublication {
        profile_id: U256,
        expected_content_uri: String,
        expected_collect_module: Address,
    },
    CollectModuleWhitelisted {
        module: Address,
        expected: bool,
    },
    /// `token_id` of `None` checks the most recently minted collect NFT.
    CollectNftOwner {
        profile_id: U256,
        pub_id: U256,
        token_id: Option<U256>,
        expected_owner: Address,
    },
    CollectNftUriMatchesContent {
        profile_id: U256,
        pub_id: U256,
        token_id: Option<U256>,
    },
    FollowNftHeld {
        profile_id: U256,
        follower: Address,
    },
    AllowanceAtLeast {
        currency: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    },
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assertion::ProfileOwner { handle, .. } => write!(f, "owner of profile `{}`", handle),
            Assertion::LatestPublication { profile_id, .. } => {
                write!(f, "latest publication of profile {}", profile_id)
            }
            Assertion::CollectModuleWhitelisted { module, .. } => {
                write!(f, "whitelist status of collect module {}", module)
            }
            Assertion::CollectNftOwner {
                profile_id, pub_id, ..
            } => write!(f, "owner of collect NFT for publication {}-{}", profile_id, pub_id),
            Assertion::CollectNftUriMatchesContent {
                profile_id, pub_id, ..
            } => write!(
                f,
                "collect NFT URI of publication {}-{} matches its content",
                profile_id, pub_id
            ),
            Assertion::FollowNftHeld {
                profile_id,
                follower,
            } => write!(f, "{} holds a follow NFT of profile {}", follower, profile_id),
            Assertion::AllowanceAtLeast {
                currency, spender, ..
            } => write!(f, "allowance of {} on {}", spender, currency),
        }
    }
}

/// Re-reads protocol state. Never sends a transaction.
///
/// A read that reverts (a token that does not exist yet, for instance) is
/// reported as a mismatch. Only transport, decode, timeout and cancellation
/// turn into `ReadError`.
#[derive(Debug, Clone)]
pub struct Verifier {
    read_timeout: Duration,
}

impl Verifier {
    pub fn new(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }

    pub async fn verify<L: Ledger>(
        &self,
        hub: &ContractHandle<L>,
        assertion: &Assertion,
        cancel: &CancellationToken,
    ) -> Result<VerificationOutcome, ReadError> {
        let outcome = self.bounded(self.evaluate(hub, assertion), cancel).await?;

        if outcome.matched {
            debug!(assertion = %outcome.assertion, observed = %outcome.observed, "post-condition holds");
        } else {
            warn!(
                assertion = %outcome.assertion,
                expected = %outcome.expected,
                observed = %outcome.observed,
                "post-condition mismatch"
            );
        }

        return Ok(outcome);
    }

    /// Runs `read` under the read timeout, racing the cancellation token.
    pub async fn bounded<T, E, F>(&self, read: F, cancel: &CancellationToken) -> Result<T, ReadError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ReadError>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ReadError::Cancelled),
            result = tokio::time::timeout(self.read_timeout, read) => match result {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err(ReadError::Timeout(self.read_timeout)),
            },
        }
    }

    async fn evaluate<L: Ledger>(
        &self,
        hub: &ContractHandle<L>,
        assertion: &Assertion,
    ) -> Result<VerificationOutcome, ReadError> {
        let lens_hub = LensHubContract::new(hub.clone());
        let description = assertion.to_string();

        let outcome = match assertion {
            Assertion::ProfileOwner {
                handle,
                expected_owner,
            } => {
                let observed = match or_revert(lens_hub.get_profile_id_by_handle(handle).await)? {
                    Some(id) if !id.is_zero() => {
                        match or_revert(lens_hub.owner_of(id).await)? {
                            Some(owner) => owner.to_string(),
                            None => format!("profile {} has no owner", id),
                        }
                    }
                    _ => "no profile".to_string(),
                };
                VerificationOutcome::new(description, expected_owner.to_string(), observed)
            }
            Assertion::LatestPublication {
                profile_id,
                expected_content_uri,
                expected_collect_module,
            } => {
                let expected = publication_summary(expected_content_uri, *expected_collect_module);
                let observed = match or_revert(lens_hub.get_pub_count(*profile_id).await)? {
                    Some(count) if !count.is_zero() => {
                        match or_revert(lens_hub.get_pub(*profile_id, count).await)? {
                            Some(publication) => publication_summary(
                                &publication.contentURI,
                                publication.collectModule,
                            ),
                            None => format!("publication {} unreadable", count),
                        }
                    }
                    _ => "no publications".to_string(),
                };
                VerificationOutcome::new(description, expected, observed)
            }
            Assertion::CollectModuleWhitelisted { module, expected } => {
                let observed = match or_revert(lens_hub.is_collect_module_whitelisted(*module).await)? {
                    Some(whitelisted) => whitelisted.to_string(),
                    None => "unknown".to_string(),
                };
                VerificationOutcome::new(description, expected.to_string(), observed)
            }
            Assertion::CollectNftOwner {
                profile_id,
                pub_id,
                token_id,
                expected_owner,
            } => {
                let observed = match collect_nft(&lens_hub, *profile_id, *pub_id).await? {
                    Some(nft) => match resolve_token(&nft, *token_id).await? {
                        Some(token_id) => match or_revert(nft.owner_of(token_id).await)? {
                            Some(owner) => owner.to_string(),
                            None => format!("token {} not minted", token_id),
                        },
                        None => "no collect NFT minted".to_string(),
                    },
                    None => "no collect NFT deployed".to_string(),
                };
                VerificationOutcome::new(description, expected_owner.to_string(), observed)
            }
            Assertion::CollectNftUriMatchesContent {
                profile_id,
                pub_id,
                token_id,
            } => {
                let expected = or_revert(lens_hub.get_content_uri(*profile_id, *pub_id).await)?
                    .unwrap_or_default();
                let observed = match collect_nft(&lens_hub, *profile_id, *pub_id).await? {
                    Some(nft) => match resolve_token(&nft, *token_id).await? {
                        Some(token_id) => match or_revert(nft.token_uri(token_id).await)? {
                            Some(uri) => uri,
                            None => format!("token {} not minted", token_id),
                        },
                        None => "no collect NFT minted".to_string(),
                    },
                    None => "no collect NFT deployed".to_string(),
                };
                VerificationOutcome::new(description, expected, observed)
            }
            Assertion::FollowNftHeld {
                profile_id,
                follower,
            } => {
                let follow_nft = or_revert(lens_hub.get_follow_nft(*profile_id).await)?
                    .filter(|address| !address.is_zero());
                let balance = match follow_nft {
                    Some(address) => {
                        let nft = FollowNftContract::new(hub.at(address));
                        or_revert(nft.balance_of(*follower).await)?.unwrap_or_default()
                    }
                    None => U256::ZERO,
                };
                VerificationOutcome {
                    assertion: description,
                    expected: "balance > 0".to_string(),
                    observed: format!("balance {}", balance),
                    matched: !balance.is_zero(),
                }
            }
            Assertion::AllowanceAtLeast {
                currency,
                owner,
                spender,
                amount,
            } => {
                let erc20 = Erc20Contract::new(hub.at(*currency));
                let allowance = or_revert(erc20.allowance(*owner, *spender).await)?;
                VerificationOutcome {
                    assertion: description,
                    expected: format!(">= {}", amount),
                    observed: match allowance {
                        Some(allowance) => allowance.to_string(),
                        None => "unreadable".to_string(),
                    },
                    matched: allowance.is_some_and(|allowance| allowance >= *amount),
                }
            }
        };

        return Ok(outcome);
    }
}

fn publication_summary(content_uri: &str, collect_module: Address) -> String {
    format!("{} collected via {}", content_uri, collect_module)
}

/// Reverted reads become `None`; anything else that failed is a `ReadError`.
fn or_revert<T>(result: Result<T, ContractsError>) -> Result<Option<T>, ReadError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_revert() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn collect_nft<L: Ledger>(
    lens_hub: &LensHubContract<L>,
    profile_id: U256,
    pub_id: U256,
) -> Result<Option<CollectNftContract<L>>, ReadError> {
    let address = or_revert(lens_hub.get_collect_nft(profile_id, pub_id).await)?
        .filter(|address| !address.is_zero());
    Ok(address.map(|address| CollectNftContract::new(lens_hub.handle().at(address))))
}

/// Token ids start at 1, so the latest mint is the total supply.
async fn resolve_token<L: Ledger>(
    nft: &CollectNftContract<L>,
    token_id: Option<U256>,
) -> Result<Option<U256>, ReadError> {
    if let Some(token_id) = token_id {
        return Ok(Some(token_id));
    }
    let supply = or_revert(nft.total_supply().await)?;
    Ok(supply.filter(|supply| !supply.is_zero()))
}
