/// Image models known to the generation provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageModel {
    #[default]
    Creative,
}

impl ImageModel {
    /// Model name for display
    pub fn name(&self) -> &str {
        match self {
            Self::Creative => "Leonardo Creative",
        }
    }

    /// Model ID for API communication
    pub fn id(&self) -> &str {
        match self {
            Self::Creative => "6bef9f1b-29cb-40c7-b9df-32b51c1f67d3",
        }
    }

    /// Model id to send when the caller did not pick one
    pub fn resolve_id(requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(Self::default().id())
            .to_string()
    }

    /// All available models
    pub fn all() -> [ImageModel; 1] {
        [Self::Creative]
    }
}
