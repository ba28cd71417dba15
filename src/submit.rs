use crate::config::SubmissionConfiguration;
use crate::errors::SubmissionError;
use crate::gas::{GasLimitSource, GasOverrides, GasPolicy};
use crate::operation::{FailureRecord, OperationRequest, SubmissionOutcome, SubmissionResult};
use alloy::network::TransactionBuilder;
use alloy::primitives::TxHash;
use contracts::{ContractHandle, Ledger, Receipt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sends one request as one transaction and waits for it to be mined.
///
/// The broadcast is never repeated. Only the receipt lookup is polled, and
/// every wait is bounded by `confirmation_timeout` and the caller's token.
/// A send abandoned mid-flight is `BroadcastOutcomeUnknown`, never `Rejected`.
#[derive(Debug, Clone)]
pub struct Submitter {
    gas: GasPolicy,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl Submitter {
    pub fn new(gas: GasPolicy, confirmation_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            gas,
            confirmation_timeout,
            poll_interval,
        }
    }

    pub fn from_config(config: &SubmissionConfiguration) -> Self {
        Self::new(
            GasPolicy::from_config(&config.gas),
            config.confirmation_timeout(),
            config.poll_interval(),
        )
    }

    pub fn gas_policy(&self) -> &GasPolicy {
        &self.gas
    }

    pub async fn submit<L: Ledger>(
        &self,
        handle: &ContractHandle<L>,
        request: &OperationRequest,
        overrides: &GasOverrides,
        cancel: &CancellationToken,
    ) -> Result<SubmissionResult, SubmissionError> {
        if cancel.is_cancelled() {
            return Err(SubmissionError::Cancelled { tx_hash: None });
        }

        let kind = request.kind();
        let ledger = handle.ledger();
        let mut tx = handle.transaction(request.call_data());

        let estimate = match self.gas.limit_source(overrides) {
            GasLimitSource::Estimated => {
                let estimate = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(SubmissionError::Cancelled { tx_hash: None }),
                    estimate = tokio::time::timeout(self.confirmation_timeout, ledger.estimate_gas(&tx)) => estimate,
                };

                let estimate = estimate
                    .map_err(|_| {
                        SubmissionError::GasEstimation(format!(
                            "node did not answer within {:?}",
                            self.confirmation_timeout
                        ))
                    })?
                    .map_err(|e| SubmissionError::GasEstimation(e.to_string()))?;
                debug!(operation = %kind, estimate, "gas estimated");
                Some(estimate)
            }
            _ => None,
        };

        tx = tx.with_gas_limit(self.gas.gas_limit(overrides, estimate)?);
        if let Some(price) = self.gas.gas_price(overrides) {
            tx = tx.with_gas_price(price);
        }

        if cancel.is_cancelled() {
            return Err(SubmissionError::Cancelled { tx_hash: None });
        }

        // Once the send is in flight, abandoning it does not mean nothing was sent.
        let tx_hash = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SubmissionError::BroadcastOutcomeUnknown(
                "cancelled while the node was answering".to_string(),
            )),
            sent = tokio::time::timeout(self.confirmation_timeout, ledger.broadcast(tx)) => sent
                .map_err(|_| SubmissionError::BroadcastOutcomeUnknown(format!(
                    "node did not answer within {:?}",
                    self.confirmation_timeout
                )))?
                .map_err(|e| SubmissionError::Rejected(e.to_string()))?,
        };
        info!(operation = %kind, %tx_hash, to = %handle.address(), "transaction broadcast");

        let receipt = self.wait_for_receipt(ledger, tx_hash, cancel).await?;

        let outcome = if receipt.status {
            info!(
                operation = %kind,
                %tx_hash,
                block_number = receipt.block_number,
                gas_used = receipt.gas_used,
                "transaction confirmed"
            );
            SubmissionOutcome::Confirmed(receipt)
        } else {
            warn!(operation = %kind, %tx_hash, block_number = receipt.block_number, "transaction reverted");
            SubmissionOutcome::Failed(FailureRecord {
                block_number: receipt.block_number,
                gas_used: receipt.gas_used,
                reason: "execution reverted".to_string(),
            })
        };

        return Ok(SubmissionResult::new(kind, handle.address(), tx_hash, outcome));
    }

    async fn wait_for_receipt<L: Ledger>(
        &self,
        ledger: &Arc<L>,
        tx_hash: TxHash,
        cancel: &CancellationToken,
    ) -> Result<Receipt, SubmissionError> {
        let deadline = Instant::now() + self.confirmation_timeout;
        let timed_out = || SubmissionError::ConfirmationTimeout {
            tx_hash,
            waited: self.confirmation_timeout,
        };
        let cancelled = || SubmissionError::Cancelled {
            tx_hash: Some(tx_hash),
        };

        loop {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                _ = tokio::time::sleep_until(deadline) => return Err(timed_out()),
                polled = ledger.receipt(tx_hash) => polled,
            };

            match polled {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => debug!(%tx_hash, "transaction still pending"),
                Err(e) => warn!(%tx_hash, error = %e, "receipt lookup failed, polling again"),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                _ = tokio::time::sleep_until(deadline) => return Err(timed_out()),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}
