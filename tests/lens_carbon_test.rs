mod common;

#[cfg(test)]
mod tests {
    use crate::common::{self, CHAIN_ID, FakeLedger, HUB, Mining, NETWORK, PROFILE_PROXY, STRANGER, USER};
    use alloy::primitives::{B256, U256};
    use contracts::LensHub;
    use lens_carbon_rust_sdk::{
        GasOverrides, LensCarbon, LensCarbonConfiguration, LensCarbonError, OperationParams,
        OperationState, ReadError, SubmissionError,
    };
    use std::io::Write;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn create_profile_params() -> OperationParams {
        OperationParams::new()
            .set("to", USER.to_string())
            .set("handle", "lenscarbon")
    }

    fn ledger_with_profile(owner: alloy::primitives::Address) -> Arc<FakeLedger> {
        let ledger = Arc::new(FakeLedger::new(USER));
        ledger.respond(
            HUB,
            LensHub::getProfileIdByHandleCall {
                handle: "lenscarbon.test".to_string(),
            },
            U256::from(34204),
        );
        ledger.respond(
            HUB,
            LensHub::ownerOfCall {
                tokenId: U256::from(34204),
            },
            owner,
        );
        ledger
    }

    #[tokio::test]
    async fn create_profile_runs_to_verified() {
        let ledger = ledger_with_profile(USER);
        let lens = LensCarbon::with_ledger(common::config(), NETWORK, ledger.clone()).unwrap();

        let report = lens
            .create_profile(&create_profile_params(), &GasOverrides::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.state, OperationState::Verified);
        assert!(report.submission.success());
        assert_eq!(report.submission.target(), PROFILE_PROXY);
        assert!(report.verification.unwrap().matched);
        assert_eq!(ledger.broadcast_count(), 1);
    }

    #[tokio::test]
    async fn mismatch_is_reported_not_raised() {
        let ledger = ledger_with_profile(STRANGER);
        let lens = LensCarbon::with_ledger(common::config(), NETWORK, ledger.clone()).unwrap();

        let report = lens
            .create_profile(&create_profile_params(), &GasOverrides::default(), &CancellationToken::new())
            .await
            .unwrap();

        let verification = report.verification.unwrap();
        assert_eq!(report.state, OperationState::Verified);
        assert!(!verification.matched);
        assert_eq!(verification.observed, STRANGER.to_string());
    }

    #[tokio::test]
    async fn mined_revert_surfaces_as_submission_error() {
        let ledger = ledger_with_profile(USER);
        ledger.set_mining(Mining::Revert);
        let lens = LensCarbon::with_ledger(common::config(), NETWORK, ledger.clone()).unwrap();

        let err = lens
            .create_profile(&create_profile_params(), &GasOverrides::default(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LensCarbonError::Submission(SubmissionError::Reverted { block_number: 41_000_000, .. })
        ));
        assert_eq!(ledger.broadcast_count(), 1);
    }

    #[tokio::test]
    async fn rejected_submission_never_reports_success() {
        let ledger = ledger_with_profile(USER);
        ledger.reject_broadcasts("insufficient funds for gas");
        let lens = LensCarbon::with_ledger(common::config(), NETWORK, ledger.clone()).unwrap();

        let err = lens
            .create_profile(&create_profile_params(), &GasOverrides::default(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LensCarbonError::Submission(SubmissionError::Rejected(_))
        ));
        assert_eq!(ledger.reads_made.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn read_failure_after_confirmation_keeps_the_tx_hash() {
        // No read responses registered: the post-condition cannot be read back.
        let ledger = Arc::new(FakeLedger::new(USER));
        let lens = LensCarbon::with_ledger(common::config(), NETWORK, ledger.clone()).unwrap();

        let err = lens
            .create_profile(&create_profile_params(), &GasOverrides::default(), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            LensCarbonError::Unverified { tx_hash, source } => {
                assert_eq!(tx_hash, B256::with_last_byte(1));
                assert!(matches!(source, ReadError::Transport(_)));
            }
            other => panic!("expected Unverified, got {other:?}"),
        }
        assert_eq!(ledger.broadcast_count(), 1);
    }

    #[tokio::test]
    async fn endpoint_on_another_chain_is_refused() {
        let ledger = Arc::new(FakeLedger::new(USER));
        ledger.set_chain_id(137);
        let lens = LensCarbon::with_ledger(common::config(), NETWORK, ledger.clone()).unwrap();

        let err = lens.ensure_chain(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, LensCarbonError::ConfigError(ref reason) if reason.contains("137")));
        assert_eq!(ledger.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn matching_or_unset_chain_id_is_accepted() {
        let ledger = Arc::new(FakeLedger::new(USER));
        let lens = LensCarbon::with_ledger(common::config(), NETWORK, ledger.clone()).unwrap();
        assert_eq!(lens.network().unwrap().chain_id, Some(CHAIN_ID));
        lens.ensure_chain(&CancellationToken::new()).await.unwrap();

        let mut config = common::config();
        if let Some(network) = config.networks.get_mut(NETWORK) {
            network.chain_id = None;
        }
        ledger.set_chain_id(137);
        let lens = LensCarbon::with_ledger(config, NETWORK, ledger).unwrap();
        lens.ensure_chain(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn profile_lookup_appends_the_network_suffix() {
        let ledger = ledger_with_profile(USER);
        let lens = LensCarbon::with_ledger(common::config(), NETWORK, ledger).unwrap();
        let cancel = CancellationToken::new();

        let id = lens.profile_id_by_handle("lenscarbon", &cancel).await.unwrap();
        assert_eq!(id, Some(U256::from(34204)));
        assert_eq!(lens.profile_owner(U256::from(34204), &cancel).await.unwrap(), USER);
    }

    #[test]
    fn unknown_network_is_rejected_up_front() {
        let ledger = Arc::new(FakeLedger::new(USER));
        assert!(LensCarbon::with_ledger(common::config(), "polygon", ledger).is_err());
    }

    #[test]
    fn config_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(common::CONFIG.as_bytes()).unwrap();

        let config = LensCarbonConfiguration::from_file(file.path()).unwrap();
        let network = config.network(NETWORK).unwrap();
        assert_eq!(network.contracts["hub"], HUB);
        assert_eq!(network.full_handle("lenscarbon"), "lenscarbon.test");
        assert_eq!(config.submission.poll_interval_ms, 5);
    }
}
