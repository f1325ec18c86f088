use serde::{Deserialize, Serialize};

/// One entry of an export request. Position in the list is authoritative,
/// the caller-supplied `order` is carried along but never used for staging.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
}

impl Scene {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            order: None,
        }
    }

    /// Scene without an asset, skipped during staging
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn asset_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Staged file name for the scene at `index` (0-based) in the request
    pub fn staged_file_name(index: usize) -> String {
        format!("scene_{}.jpg", index + 1)
    }
}
