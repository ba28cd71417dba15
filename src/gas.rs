use crate::config::GasConfiguration;
use crate::errors::SubmissionError;
use tracing::debug;

/// Per-call values that win over everything configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasOverrides {
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasLimitSource {
    Override,
    Configured,
    Estimated,
}

/// One place that decides gas limit and price for every submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPolicy {
    limit: Option<u64>,
    headroom_percent: u64,
    ceiling: Option<u64>,
    price_wei: Option<u128>,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self::from_config(&GasConfiguration::default())
    }
}

impl GasPolicy {
    pub fn from_config(config: &GasConfiguration) -> Self {
        Self {
            limit: config.limit,
            headroom_percent: config.headroom_percent,
            ceiling: config.ceiling,
            price_wei: config.price_wei,
        }
    }

    /// Where the limit comes from for these overrides. `Estimated` means the
    /// caller has to ask the node first.
    pub fn limit_source(&self, overrides: &GasOverrides) -> GasLimitSource {
        if overrides.gas_limit.is_some() {
            GasLimitSource::Override
        } else if self.limit.is_some() {
            GasLimitSource::Configured
        } else {
            GasLimitSource::Estimated
        }
    }

    /// Final gas limit, checked against the ceiling.
    ///
    /// `estimate` is only consulted when neither an override nor a fixed
    /// limit is present.
    pub fn gas_limit(
        &self,
        overrides: &GasOverrides,
        estimate: Option<u64>,
    ) -> Result<u64, SubmissionError> {
        let limit = match (overrides.gas_limit, self.limit, estimate) {
            (Some(limit), _, _) => limit,
            (None, Some(limit), _) => limit,
            (None, None, Some(estimate)) => self.with_headroom(estimate),
            (None, None, None) => {
                return Err(SubmissionError::GasEstimation(
                    "no gas estimate available".to_string(),
                ));
            }
        };

        if let Some(ceiling) = self.ceiling {
            if limit > ceiling {
                return Err(SubmissionError::GasCeilingExceeded {
                    requested: limit,
                    ceiling,
                });
            }
        }

        debug!(gas_limit = limit, source = ?self.limit_source(overrides), "gas limit chosen");
        Ok(limit)
    }

    /// `None` leaves pricing to the node.
    pub fn gas_price(&self, overrides: &GasOverrides) -> Option<u128> {
        overrides.gas_price.or(self.price_wei)
    }

    fn with_headroom(&self, estimate: u64) -> u64 {
        let extra = estimate.saturating_mul(self.headroom_percent) / 100;
        estimate.saturating_add(extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(limit: Option<u64>, ceiling: Option<u64>) -> GasPolicy {
        GasPolicy::from_config(&GasConfiguration {
            limit,
            headroom_percent: 20,
            ceiling,
            price_wei: Some(30_000_000_000),
        })
    }

    #[test]
    fn estimate_gets_headroom() {
        let policy = policy(None, None);
        let limit = policy
            .gas_limit(&GasOverrides::default(), Some(100_000))
            .unwrap();
        assert_eq!(limit, 120_000);
    }

    #[test]
    fn override_beats_configured_limit() {
        let policy = policy(Some(500_000), None);
        let overrides = GasOverrides {
            gas_limit: Some(210_000),
            gas_price: Some(1),
        };

        assert_eq!(policy.limit_source(&overrides), GasLimitSource::Override);
        assert_eq!(policy.gas_limit(&overrides, None).unwrap(), 210_000);
        assert_eq!(policy.gas_price(&overrides), Some(1));

        let defaults = GasOverrides::default();
        assert_eq!(policy.limit_source(&defaults), GasLimitSource::Configured);
        assert_eq!(policy.gas_limit(&defaults, None).unwrap(), 500_000);
        assert_eq!(policy.gas_price(&defaults), Some(30_000_000_000));
    }

    #[test]
    fn ceiling_rejects_oversized_limits() {
        let policy = policy(None, Some(5_000_000));
        let overrides = GasOverrides {
            gas_limit: Some(1000 * 10000),
            gas_price: None,
        };

        let err = policy.gas_limit(&overrides, None).unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::GasCeilingExceeded {
                requested: 10_000_000,
                ceiling: 5_000_000
            }
        ));
    }

    #[test]
    fn estimated_source_needs_an_estimate() {
        let policy = policy(None, None);
        assert!(matches!(
            policy.gas_limit(&GasOverrides::default(), None),
            Err(SubmissionError::GasEstimation(_))
        ));
    }
}
