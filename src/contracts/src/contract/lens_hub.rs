use crate::errors::ContractsError;
use crate::{ContractHandle, LensHub, Ledger, PublicationStruct};
use alloy::primitives::{Address, U256};

pub struct LensHubContract<L: Ledger> {
    handle: ContractHandle<L>,
}

impl<L: Ledger> LensHubContract<L> {
    pub fn new(handle: ContractHandle<L>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &ContractHandle<L> {
        &self.handle
    }

    /// Returns zero when no profile is registered under `handle`.
    pub async fn get_profile_id_by_handle(&self, handle: &str) -> Result<U256, ContractsError> {
        let result = self
            .handle
            .read(LensHub::getProfileIdByHandleCall {
                handle: handle.to_string(),
            })
            .await?;

        Ok(result)
    }

    pub async fn owner_of(&self, profile_id: U256) -> Result<Address, ContractsError> {
        let result = self
            .handle
            .read(LensHub::ownerOfCall {
                tokenId: profile_id,
            })
            .await?;

        Ok(result)
    }

    pub async fn total_supply(&self) -> Result<U256, ContractsError> {
        let result = self.handle.read(LensHub::totalSupplyCall {}).await?;
        Ok(result)
    }

    pub async fn get_pub(
        &self,
        profile_id: U256,
        pub_id: U256,
    ) -> Result<PublicationStruct, ContractsError> {
        let result = self
            .handle
            .read(LensHub::getPubCall {
                profileId: profile_id,
                pubId: pub_id,
            })
            .await?;

        Ok(result)
    }

    pub async fn get_pub_count(&self, profile_id: U256) -> Result<U256, ContractsError> {
        let result = self
            .handle
            .read(LensHub::getPubCountCall {
                profileId: profile_id,
            })
            .await?;

        Ok(result)
    }

    pub async fn get_content_uri(
        &self,
        profile_id: U256,
        pub_id: U256,
    ) -> Result<String, ContractsError> {
        let result = self
            .handle
            .read(LensHub::getContentURICall {
                profileId: profile_id,
                pubId: pub_id,
            })
            .await?;

        Ok(result)
    }

    pub async fn get_collect_nft(
        &self,
        profile_id: U256,
        pub_id: U256,
    ) -> Result<Address, ContractsError> {
        let result = self
            .handle
            .read(LensHub::getCollectNFTCall {
                profileId: profile_id,
                pubId: pub_id,
            })
            .await?;

        Ok(result)
    }

    pub async fn get_follow_nft(&self, profile_id: U256) -> Result<Address, ContractsError> {
        let result = self
            .handle
            .read(LensHub::getFollowNFTCall {
                profileId: profile_id,
            })
            .await?;

        Ok(result)
    }

    pub async fn is_collect_module_whitelisted(
        &self,
        collect_module: Address,
    ) -> Result<bool, ContractsError> {
        let result = self
            .handle
            .read(LensHub::isCollectModuleWhitelistedCall {
                collectModule: collect_module,
            })
            .await?;

        Ok(result)
    }
}
