use crate::errors::ContractsError;
use crate::{ContractHandle, FollowNFT, Ledger};
use alloy::primitives::{Address, U256};

pub struct FollowNftContract<L: Ledger> {
    handle: ContractHandle<L>,
}

impl<L: Ledger> FollowNftContract<L> {
    pub fn new(handle: ContractHandle<L>) -> Self {
        Self { handle }
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256, ContractsError> {
        let result = self
            .handle
            .read(FollowNFT::balanceOfCall { owner })
            .await?;

        Ok(result)
    }
}
