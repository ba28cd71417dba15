use crate::{CreateProfileData, IERC20, LensHub, PostData, ProfileCreationProxy};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

pub struct CallDataBuilder {}

impl CallDataBuilder {
    pub fn new() -> Self {
        Self {}
    }

    pub fn build_create_profile_call_data(&self, vars: CreateProfileData) -> Bytes {
        let result = ProfileCreationProxy::proxyCreateProfileCall { vars }.abi_encode();
        return result.into();
    }

    pub fn build_post_call_data(&self, vars: PostData) -> Bytes {
        let result = LensHub::postCall { vars }.abi_encode();
        return result.into();
    }

    pub fn build_whitelist_collect_module_call_data(
        &self,
        collect_module: Address,
        whitelist: bool,
    ) -> Bytes {
        let result = LensHub::whitelistCollectModuleCall {
            collectModule: collect_module,
            whitelist,
        }
        .abi_encode();
        return result.into();
    }

    pub fn build_collect_call_data(&self, profile_id: U256, pub_id: U256, data: Bytes) -> Bytes {
        let result = LensHub::collectCall {
            profileId: profile_id,
            pubId: pub_id,
            data,
        }
        .abi_encode();
        return result.into();
    }

    pub fn build_follow_call_data(&self, profile_ids: Vec<U256>, datas: Vec<Bytes>) -> Bytes {
        let result = LensHub::followCall {
            profileIds: profile_ids,
            datas,
        }
        .abi_encode();
        return result.into();
    }

    pub fn build_approve_call_data(&self, spender: Address, amount: U256) -> Bytes {
        let result = IERC20::approveCall { spender, amount }.abi_encode();
        return result.into();
    }
}

impl Default for CallDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}
