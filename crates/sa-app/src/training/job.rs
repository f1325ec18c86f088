use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TrainingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrainingStatus::Completed | TrainingStatus::Failed)
    }
}

/// Stored form; the database owns `id`, so the job id lives in `jobId`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrainingRecord {
    pub job_id: String,
    pub status: TrainingStatus,
    pub progress: u8,
    pub image_paths: Vec<String>,
    #[serde(default)]
    pub training_config: Value,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub model_url: Option<String>,
}

impl TrainingRecord {
    pub fn pending(job_id: impl Into<String>, image_paths: Vec<String>, training_config: Value) -> Self {
        Self {
            job_id: job_id.into(),
            status: TrainingStatus::Pending,
            progress: 0,
            image_paths,
            training_config,
            created_at: Utc::now(),
            completed_at: None,
            model_url: None,
        }
    }
}

/// One LoRA fine-tuning request and its simulated progress
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingJob {
    pub id: String,
    pub status: TrainingStatus,
    pub progress: u8,
    pub image_paths: Vec<String>,
    pub training_config: Value,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub model_url: Option<String>,
}

impl From<TrainingRecord> for TrainingJob {
    fn from(record: TrainingRecord) -> Self {
        Self {
            id: record.job_id,
            status: record.status,
            progress: record.progress,
            image_paths: record.image_paths,
            training_config: record.training_config,
            created_at: record.created_at,
            completed_at: record.completed_at,
            model_url: record.model_url,
        }
    }
}

pub fn mock_model_url(job_id: &str) -> String {
    format!("https://mockup-lora-model.com/{job_id}.lora")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let record = TrainingRecord::pending("lora-training-1", vec!["a.png".into()], json!({"steps": 500}));
        let stored = serde_json::to_value(&record).unwrap();
        assert_eq!(stored["jobId"], "lora-training-1");
        assert!(stored.get("id").is_none());

        let value = serde_json::to_value(TrainingJob::from(record)).unwrap();
        assert_eq!(value["id"], "lora-training-1");
        assert!(value.get("jobId").is_none());
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["progress"], 0);
        assert_eq!(value["imagePaths"][0], "a.png");
        assert_eq!(value["trainingConfig"]["steps"], 500);
        assert!(value["completedAt"].is_null());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!TrainingStatus::Pending.is_terminal());
        assert!(!TrainingStatus::InProgress.is_terminal());
        assert!(TrainingStatus::Completed.is_terminal());
        assert!(TrainingStatus::Failed.is_terminal());
        assert_eq!(mock_model_url("x"), "https://mockup-lora-model.com/x.lora");
    }
}
