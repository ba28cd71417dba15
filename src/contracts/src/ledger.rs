use crate::ContractsError;
use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, B256, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

/// Confirmation record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub block_hash: B256,
    pub gas_used: u64,
    pub effective_gas_price: u128,
    pub status: bool,
}

/// The remote ledger as seen by the submission helper.
///
/// `broadcast` sends exactly one signed transaction and returns its hash; it
/// must never resend on its own. `receipt` returns `None` while the
/// transaction is still pending.
#[async_trait]
pub trait Ledger: Send + Sync {
    fn sender(&self) -> Address;

    /// Chain id reported by the endpoint the ledger signs for.
    async fn chain_id(&self) -> Result<u64, ContractsError>;

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ContractsError>;

    async fn broadcast(&self, tx: TransactionRequest) -> Result<TxHash, ContractsError>;

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, ContractsError>;

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ContractsError>;
}

pub struct AlloyLedger {
    provider: DynProvider,
    sender: Address,
}

impl AlloyLedger {
    pub fn connect(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, ContractsError> {
        let sender = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url.parse()?)
            .erased();

        Ok(Self { provider, sender })
    }
}

#[async_trait]
impl Ledger for AlloyLedger {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> Result<u64, ContractsError> {
        let chain_id = self.provider.get_chain_id().await?;
        Ok(chain_id)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ContractsError> {
        let gas = self.provider.estimate_gas(tx.clone()).await?;
        Ok(gas)
    }

    async fn broadcast(&self, tx: TransactionRequest) -> Result<TxHash, ContractsError> {
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, ContractsError> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;

        // Pending receipts without a block are treated as not yet mined.
        let result = receipt.and_then(|receipt| {
            Some(Receipt {
                tx_hash: receipt.transaction_hash,
                block_number: receipt.block_number?,
                block_hash: receipt.block_hash?,
                gas_used: receipt.gas_used,
                effective_gas_price: receipt.effective_gas_price,
                status: receipt.status(),
            })
        });

        Ok(result)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ContractsError> {
        let result = self.provider.call(tx).await?;
        Ok(result)
    }
}
