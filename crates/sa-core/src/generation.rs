use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Image,
    Video,
}

/// Status of a provider-side job. The provider never reports an explicit
/// failure for image/video jobs, so `Error` is only inferred by callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStatus {
    Pending,
    Complete,
    Error,
}

impl GenerationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

/// Snapshot of a job living entirely at the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationJob {
    pub id: String,
    pub kind: GenerationKind,
    pub status: GenerationStatus,
    pub result_url: Option<String>,
}

impl GenerationJob {
    pub fn pending(id: impl Into<String>, kind: GenerationKind) -> Self {
        Self {
            id: id.into(),
            kind,
            status: GenerationStatus::Pending,
            result_url: None,
        }
    }

    /// Build from one poll; a URL means the job is complete
    pub fn from_poll(id: impl Into<String>, kind: GenerationKind, url: Option<String>) -> Self {
        match url {
            Some(url) => Self {
                id: id.into(),
                kind,
                status: GenerationStatus::Complete,
                result_url: Some(url),
            },
            None => Self::pending(id, kind),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == GenerationStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_poll() {
        let pending = GenerationJob::from_poll("g1", GenerationKind::Image, None);
        assert_eq!(pending.status, GenerationStatus::Pending);
        assert!(pending.result_url.is_none());

        let done = GenerationJob::from_poll("g1", GenerationKind::Video, Some("http://v.mp4".into()));
        assert!(done.is_complete());
        assert!(done.status.is_terminal());
        assert_eq!(done.result_url.as_deref(), Some("http://v.mp4"));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&GenerationStatus::Pending).unwrap(), "\"PENDING\"");
        assert_eq!(serde_json::to_string(&GenerationStatus::Complete).unwrap(), "\"COMPLETE\"");
        assert_eq!(serde_json::to_string(&GenerationKind::Video).unwrap(), "\"video\"");
    }
}
