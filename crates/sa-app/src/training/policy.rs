use std::time::Duration;
use chrono::{DateTime, TimeDelta, Utc};
use crate::training::job::{TrainingJob, TrainingStatus};

/// Decides whether a pending training job should now count as finished
pub trait CompletionPolicy: Send + Sync {
    fn is_completed(&self, job: &TrainingJob, now: DateTime<Utc>) -> bool;
}

/// Finished once a fixed amount of time has passed since creation
#[derive(Debug, Clone, Copy)]
pub struct ElapsedPolicy {
    pub threshold: Duration,
}

impl ElapsedPolicy {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }
}

impl CompletionPolicy for ElapsedPolicy {
    fn is_completed(&self, job: &TrainingJob, now: DateTime<Utc>) -> bool {
        if job.status != TrainingStatus::Pending {
            return false;
        }
        let threshold = TimeDelta::from_std(self.threshold).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(job.created_at) >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use crate::training::job::TrainingRecord;

    #[test]
    fn test_elapsed_threshold() {
        let policy = ElapsedPolicy::new(Duration::from_secs(10));
        let job = TrainingJob::from(TrainingRecord::pending("j", vec![], Value::Null));

        assert!(!policy.is_completed(&job, job.created_at + TimeDelta::seconds(9)));
        assert!(policy.is_completed(&job, job.created_at + TimeDelta::seconds(10)));
    }

    #[test]
    fn test_only_pending_jobs_complete() {
        let policy = ElapsedPolicy::new(Duration::ZERO);
        let mut job = TrainingJob::from(TrainingRecord::pending("j", vec![], Value::Null));
        job.status = TrainingStatus::Failed;

        assert!(!policy.is_completed(&job, Utc::now()));
    }
}
