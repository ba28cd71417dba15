#![allow(dead_code)]

use alloy::primitives::{Address, B256, Bytes, TxHash, address};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use contracts::{ContractsError, Ledger, Receipt};
use lens_carbon_rust_sdk::LensCarbonConfiguration;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

pub const NETWORK: &str = "mumbai-sandbox";
pub const HUB: Address = address!("7582177F9E536aB0b6c721e11f383C326F2Ad1D5");
pub const PROFILE_PROXY: Address = address!("4fe8deB1cf6068060dE50aA584C3adf00fbDB87f");
pub const FREE_COLLECT: Address = address!("0BE6bD7092ee83D44a6eC1D949626FeE48caB30c");
pub const NCT_RETIRE: Address = address!("e8C0BF8Cc8bDD7a764E81DF7490A30fbf0FC8E89");
pub const USDC: Address = address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
pub const USER: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
pub const STRANGER: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

pub const CHAIN_ID: u64 = 80001;

pub const CONFIG: &str = r#"{
    "networks": {
        "mumbai-sandbox": {
            "chain_id": 80001,
            "rpc_url": "http://127.0.0.1:8545",
            "handle_suffix": ".test",
            "contracts": {
                "hub": "0x7582177F9E536aB0b6c721e11f383C326F2Ad1D5",
                "profile-creation-proxy": "0x4fe8deB1cf6068060dE50aA584C3adf00fbDB87f"
            },
            "modules": {
                "free-collect": {
                    "address": "0x0BE6bD7092ee83D44a6eC1D949626FeE48caB30c",
                    "kind": "collect",
                    "schema": "free-collect-v1"
                },
                "nct-retire": {
                    "address": "0xe8C0BF8Cc8bDD7a764E81DF7490A30fbf0FC8E89",
                    "kind": "collect",
                    "schema": "fee-collect-v1"
                }
            }
        }
    },
    "submission": {
        "confirmation_timeout_secs": 2,
        "poll_interval_ms": 5,
        "read_timeout_secs": 2
    }
}"#;

pub fn config() -> LensCarbonConfiguration {
    LensCarbonConfiguration::from_json_str(CONFIG).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mining {
    /// Mined with success status after `pending_polls` empty lookups.
    Confirm,
    /// Mined with failed status.
    Revert,
    /// Never mined.
    Stall,
}

#[derive(Debug, Clone)]
enum ReadResponse {
    Return(Bytes),
    Revert,
}

/// In-memory ledger. Counts every call and answers reads from a table
/// keyed by target address and calldata.
pub struct FakeLedger {
    sender: Address,
    chain_id: AtomicU64,
    stall_estimates: AtomicBool,
    stall_broadcasts: AtomicBool,
    stall_reads: AtomicBool,
    mining: Mutex<Mining>,
    reject: Mutex<Option<String>>,
    estimate_revert: Mutex<Option<String>>,
    pending_polls: AtomicUsize,
    failing_polls: AtomicUsize,
    reads: Mutex<HashMap<(Address, Bytes), ReadResponse>>,
    sent: Mutex<Vec<TransactionRequest>>,
    pub broadcasts: AtomicUsize,
    pub estimates: AtomicUsize,
    pub receipt_polls: AtomicUsize,
    pub reads_made: AtomicUsize,
}

impl FakeLedger {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            chain_id: AtomicU64::new(CHAIN_ID),
            stall_estimates: AtomicBool::new(false),
            stall_broadcasts: AtomicBool::new(false),
            stall_reads: AtomicBool::new(false),
            mining: Mutex::new(Mining::Confirm),
            reject: Mutex::new(None),
            estimate_revert: Mutex::new(None),
            pending_polls: AtomicUsize::new(0),
            failing_polls: AtomicUsize::new(0),
            reads: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            broadcasts: AtomicUsize::new(0),
            estimates: AtomicUsize::new(0),
            receipt_polls: AtomicUsize::new(0),
            reads_made: AtomicUsize::new(0),
        }
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.chain_id.store(chain_id, Ordering::SeqCst);
    }

    /// Estimates never answer.
    pub fn stall_estimates(&self) {
        self.stall_estimates.store(true, Ordering::SeqCst);
    }

    /// Broadcasts are counted, then never answer.
    pub fn stall_broadcasts(&self) {
        self.stall_broadcasts.store(true, Ordering::SeqCst);
    }

    /// Reads never answer.
    pub fn stall_reads(&self) {
        self.stall_reads.store(true, Ordering::SeqCst);
    }

    pub fn set_mining(&self, mining: Mining) {
        *self.mining.lock().unwrap() = mining;
    }

    pub fn reject_broadcasts(&self, reason: &str) {
        *self.reject.lock().unwrap() = Some(reason.to_string());
    }

    pub fn revert_estimates(&self, reason: &str) {
        *self.estimate_revert.lock().unwrap() = Some(reason.to_string());
    }

    /// Lookups that return "still pending" before the receipt shows up.
    pub fn pending_for(&self, polls: usize) {
        self.pending_polls.store(polls, Ordering::SeqCst);
    }

    /// Lookups that fail with a transport error before anything else.
    pub fn failing_for(&self, polls: usize) {
        self.failing_polls.store(polls, Ordering::SeqCst);
    }

    pub fn respond<C: SolCall, V: SolValue>(&self, to: Address, call: C, value: V) {
        self.reads.lock().unwrap().insert(
            (to, call.abi_encode().into()),
            ReadResponse::Return(value.abi_encode().into()),
        );
    }

    pub fn revert_on<C: SolCall>(&self, to: Address, call: C) {
        self.reads
            .lock()
            .unwrap()
            .insert((to, call.abi_encode().into()), ReadResponse::Revert);
    }

    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.broadcasts.load(Ordering::SeqCst)
            + self.estimates.load(Ordering::SeqCst)
            + self.receipt_polls.load(Ordering::SeqCst)
            + self.reads_made.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

fn tx_hash(index: usize) -> TxHash {
    B256::with_last_byte(index as u8 + 1)
}

#[async_trait]
impl Ledger for FakeLedger {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> Result<u64, ContractsError> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> Result<u64, ContractsError> {
        self.estimates.fetch_add(1, Ordering::SeqCst);
        if self.stall_estimates.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        match self.estimate_revert.lock().unwrap().clone() {
            Some(reason) => Err(ContractsError::Reverted(reason)),
            None => Ok(100_000),
        }
    }

    async fn broadcast(&self, tx: TransactionRequest) -> Result<TxHash, ContractsError> {
        let index = self.broadcasts.fetch_add(1, Ordering::SeqCst);
        if self.stall_broadcasts.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = self.reject.lock().unwrap().clone() {
            return Err(ContractsError::TransportError(reason));
        }
        self.sent.lock().unwrap().push(tx);
        Ok(tx_hash(index))
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, ContractsError> {
        self.receipt_polls.fetch_add(1, Ordering::SeqCst);

        if self
            .failing_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ContractsError::TransportError("connection reset".to_string()));
        }
        if self
            .pending_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Ok(None);
        }

        let status = match *self.mining.lock().unwrap() {
            Mining::Confirm => true,
            Mining::Revert => false,
            Mining::Stall => return Ok(None),
        };

        Ok(Some(Receipt {
            tx_hash,
            block_number: 41_000_000,
            block_hash: B256::repeat_byte(0x11),
            gas_used: 84_000,
            effective_gas_price: 30_000_000_000,
            status,
        }))
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ContractsError> {
        self.reads_made.fetch_add(1, Ordering::SeqCst);
        if self.stall_reads.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let to = tx
            .to
            .and_then(|kind| kind.to().copied())
            .unwrap_or_default();
        let input = tx.input.input().cloned().unwrap_or_default();

        match self.reads.lock().unwrap().get(&(to, input)) {
            Some(ReadResponse::Return(data)) => Ok(data.clone()),
            Some(ReadResponse::Revert) => {
                Err(ContractsError::Reverted("execution reverted".to_string()))
            }
            None => Err(ContractsError::TransportError(format!(
                "no response registered for call to {}",
                to
            ))),
        }
    }
}
