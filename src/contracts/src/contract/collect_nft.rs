use crate::errors::ContractsError;
use crate::{CollectNFT, ContractHandle, Ledger};
use alloy::primitives::{Address, U256};

pub struct CollectNftContract<L: Ledger> {
    handle: ContractHandle<L>,
}

impl<L: Ledger> CollectNftContract<L> {
    pub fn new(handle: ContractHandle<L>) -> Self {
        Self { handle }
    }

    pub async fn owner_of(&self, token_id: U256) -> Result<Address, ContractsError> {
        let result = self
            .handle
            .read(CollectNFT::ownerOfCall { tokenId: token_id })
            .await?;

        Ok(result)
    }

    pub async fn token_uri(&self, token_id: U256) -> Result<String, ContractsError> {
        let result = self
            .handle
            .read(CollectNFT::tokenURICall { tokenId: token_id })
            .await?;

        Ok(result)
    }

    pub async fn total_supply(&self) -> Result<U256, ContractsError> {
        let result = self.handle.read(CollectNFT::totalSupplyCall {}).await?;
        Ok(result)
    }
}
