pub mod collect_nft;
pub mod erc20;
pub mod follow_nft;
pub mod lens_hub;
