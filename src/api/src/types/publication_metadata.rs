use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    #[serde(rename = "traitType", default)]
    pub trait_type: Option<String>,
    #[serde(rename = "displayType", default)]
    pub display_type: Option<String>,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataMedia {
    pub item: String,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "altTag", default)]
    pub alt_tag: Option<String>,
}

impl MetadataMedia {
    pub fn is_image(&self) -> bool {
        matches!(self.mime_type.as_deref(), Some("image/jpeg") | Some("image/png"))
    }
}

/// Publication metadata document a content URI points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationMetadata {
    pub version: String,
    #[serde(default)]
    pub metadata_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "imageMimeType", default)]
    pub image_mime_type: Option<String>,
    #[serde(default)]
    pub attributes: Vec<MetadataAttribute>,
    #[serde(default)]
    pub media: Vec<MetadataMedia>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(rename = "mainContentFocus", default)]
    pub main_content_focus: Option<String>,
    #[serde(rename = "appId", default)]
    pub app_id: Option<String>,
}
