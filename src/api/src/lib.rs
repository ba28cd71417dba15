use crate::errors::ApiError;
use crate::types::publication_metadata::PublicationMetadata;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub mod errors;
pub mod types;

const IPFS_SCHEME: &str = "ipfs://";
const ARWEAVE_SCHEME: &str = "ar://";

/// Fetches content addressed by `ipfs://`, `ar://` or plain http(s) URIs.
pub struct GatewayProvider {
    client: Client,
    ipfs_gateway: Url,
    arweave_gateway: Url,
}

impl GatewayProvider {
    pub fn new(ipfs_gateway: &str, arweave_gateway: &str) -> Result<Self, ApiError> {
        Ok(GatewayProvider {
            client: Client::new(),
            ipfs_gateway: Url::parse(ipfs_gateway)?,
            arweave_gateway: Url::parse(arweave_gateway)?,
        })
    }

    /// Like `new`, with every request bounded by `timeout`.
    pub fn with_timeout(
        ipfs_gateway: &str,
        arweave_gateway: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        Ok(GatewayProvider {
            client: Client::builder().timeout(timeout).build()?,
            ipfs_gateway: Url::parse(ipfs_gateway)?,
            arweave_gateway: Url::parse(arweave_gateway)?,
        })
    }

    /// Rewrites a content URI to an HTTP URL served by the configured gateways.
    pub fn resolve_uri(&self, uri: &str) -> Result<Url, ApiError> {
        if let Some(cid) = uri.strip_prefix(IPFS_SCHEME) {
            let url = self.ipfs_gateway.join(&format!("/ipfs/{}", cid))?;
            return Ok(url);
        }

        if let Some(id) = uri.strip_prefix(ARWEAVE_SCHEME) {
            let url = self.arweave_gateway.join(&format!("/{}", id))?;
            return Ok(url);
        }

        let url = Url::parse(uri)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ApiError::UnsupportedUri(uri.to_string())),
        }
    }

    pub async fn get_publication_metadata(
        &self,
        content_uri: &str,
    ) -> Result<PublicationMetadata, ApiError> {
        let url = self.resolve_uri(content_uri)?;

        let response = self.client.get(url).send().await?;

        let status = response.status();

        if status.is_success() {
            let result: PublicationMetadata = response.json().await?;
            return Ok(result);
        }

        let error_body = response.text().await?;

        return Err(ApiError::HttpError { body: error_body });
    }
}
