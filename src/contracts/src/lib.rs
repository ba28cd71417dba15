pub mod call_data_builder;
pub mod contract;
pub mod errors;
pub mod handle;
pub mod init_data;
pub mod ledger;
pub mod utils;

pub use crate::errors::ContractsError;
pub use crate::handle::ContractHandle;
pub use crate::init_data::InitDataSchema;
pub use crate::ledger::{AlloyLedger, Ledger, Receipt};

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct CreateProfileData {
        address to;
        string handle;
        string imageURI;
        address followModule;
        bytes followModuleInitData;
        string followNFTURI;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct PostData {
        uint256 profileId;
        string contentURI;
        address collectModule;
        bytes collectModuleInitData;
        address referenceModule;
        bytes referenceModuleInitData;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct PublicationStruct {
        uint256 profileIdPointed;
        uint256 pubIdPointed;
        string contentURI;
        address referenceModule;
        address collectModule;
        address collectNFT;
    }

    #[derive(Debug, PartialEq, Eq)]
    interface LensHub {
        function post(PostData calldata vars) external returns (uint256);
        function collect(uint256 profileId, uint256 pubId, bytes calldata data) external returns (uint256);
        function follow(uint256[] calldata profileIds, bytes[] calldata datas) external returns (uint256[] memory);
        function whitelistCollectModule(address collectModule, bool whitelist) external;

        function getProfileIdByHandle(string calldata handle) external view returns (uint256);
        function ownerOf(uint256 tokenId) external view returns (address);
        function totalSupply() external view returns (uint256);
        function getPub(uint256 profileId, uint256 pubId) external view returns (PublicationStruct memory);
        function getPubCount(uint256 profileId) external view returns (uint256);
        function getContentURI(uint256 profileId, uint256 pubId) external view returns (string memory);
        function getCollectNFT(uint256 profileId, uint256 pubId) external view returns (address);
        function getFollowNFT(uint256 profileId) external view returns (address);
        function isCollectModuleWhitelisted(address collectModule) external view returns (bool);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface ProfileCreationProxy {
        function proxyCreateProfile(CreateProfileData memory vars) external;
    }

    #[derive(Debug, PartialEq, Eq)]
    interface CollectNFT {
        function ownerOf(uint256 tokenId) external view returns (address);
        function tokenURI(uint256 tokenId) external view returns (string memory);
        function totalSupply() external view returns (uint256);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface FollowNFT {
        function balanceOf(address owner) external view returns (uint256);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}
