use crate::{ContractsError, Ledger};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use std::sync::Arc;

/// A deployed contract address bound to a calling identity.
///
/// Binding never touches the network; the first `read` or submission is
/// where a wrong address or an unreachable node shows up.
pub struct ContractHandle<L: Ledger> {
    address: Address,
    ledger: Arc<L>,
}

impl<L: Ledger> Clone for ContractHandle<L> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            ledger: self.ledger.clone(),
        }
    }
}

impl<L: Ledger> ContractHandle<L> {
    pub fn bind(address: Address, ledger: Arc<L>) -> Self {
        Self { address, ledger }
    }

    /// Same identity, different contract.
    pub fn at(&self, address: Address) -> Self {
        Self::bind(address, self.ledger.clone())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sender(&self) -> Address {
        self.ledger.sender()
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn transaction(&self, input: Bytes) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.ledger.sender())
            .with_to(self.address)
            .with_input(input)
    }

    pub async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, ContractsError> {
        let tx = self.transaction(call.abi_encode().into());
        let data = self.ledger.call(tx).await?;

        let result = C::abi_decode_returns(&data)?;
        Ok(result)
    }
}
