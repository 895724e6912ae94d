use serde::{Deserialize, Serialize};

/// Body accepted by `POST /api/upload-image`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl UploadRequest {
    pub fn new(image_data: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            image_data: Some(image_data.into()),
            prompt: Some(prompt.into()),
        }
    }

    pub fn image_data(&self) -> Option<&str> {
        self.image_data.as_deref().filter(|d| !d.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

/// Options attached to every object written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PutOptions {
    pub access: Access,
    pub content_type: String,
    pub add_random_suffix: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
        }
    }
}

impl PutOptions {
    pub fn public(content_type: impl Into<String>) -> Self {
        Self {
            access: Access::Public,
            content_type: content_type.into(),
            add_random_suffix: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub url: String,
    #[serde(default)]
    pub pathname: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}
