use crate::errors::ContractsError;
use crate::{ContractHandle, IERC20, Ledger};
use alloy::primitives::{Address, U256};

pub struct Erc20Contract<L: Ledger> {
    handle: ContractHandle<L>,
}

impl<L: Ledger> Erc20Contract<L> {
    pub fn new(handle: ContractHandle<L>) -> Self {
        Self { handle }
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ContractsError> {
        let result = self
            .handle
            .read(IERC20::allowanceCall { owner, spender })
            .await?;

        Ok(result)
    }
}
