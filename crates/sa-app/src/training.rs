pub mod job;
pub mod policy;

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;
use crate::training::job::{TrainingJob, TrainingRecord, TrainingStatus, mock_model_url};
use crate::training::policy::{CompletionPolicy, ElapsedPolicy};

const TRAINING_JOBS: &str = "training_jobs";

const COMPLETE_IF_PENDING: &str = "UPDATE type::thing($tb, $id) \
    SET status = 'COMPLETED', progress = 100, completedAt = $now, modelUrl = $url \
    WHERE status = 'PENDING' RETURN AFTER";

/// Simulated LoRA training jobs persisted in SurrealDB.
///
/// A job completes either when its deferred timer fires or when a read finds
/// that the completion policy considers it done. Both paths go through the
/// same conditional update so completion is applied at most once.
#[derive(Clone)]
pub struct TrainingStore {
    db: Surreal<Db>,
    policy: Arc<dyn CompletionPolicy>,
    completion_delay: Option<Duration>,
}

impl TrainingStore {
    pub fn new(db: Surreal<Db>, completion_after: Duration) -> Self {
        Self {
            db,
            policy: Arc::new(ElapsedPolicy::new(completion_after)),
            completion_delay: Some(completion_after),
        }
    }

    /// Store with a custom policy. `completion_delay` of `None` disables the timer
    pub fn with_policy(
        db: Surreal<Db>,
        policy: Arc<dyn CompletionPolicy>,
        completion_delay: Option<Duration>,
    ) -> Self {
        Self { db, policy, completion_delay }
    }

    pub async fn create(&self, image_paths: Vec<String>, training_config: Value) -> Result<String, surrealdb::Error> {
        let job_id = format!("lora-training-{}", Uuid::new_v4());
        let record = TrainingRecord::pending(job_id.clone(), image_paths, training_config);

        let _: Option<TrainingRecord> = self.db
            .create((TRAINING_JOBS, job_id.clone()))
            .content(record)
            .await?;

        info!("Training job {} queued", job_id);

        if let Some(delay) = self.completion_delay {
            let store = self.clone();
            let timer_id = job_id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = store.complete_if_pending(&timer_id).await {
                    warn!("Deferred completion of {} failed: {}", timer_id, e);
                }
            });
        }

        Ok(job_id)
    }

    pub async fn status(&self, job_id: &str) -> Result<Option<TrainingJob>, surrealdb::Error> {
        let Some(job) = self.get(job_id).await? else {
            return Ok(None);
        };

        if job.status == TrainingStatus::Pending && self.policy.is_completed(&job, Utc::now()) {
            if let Some(done) = self.complete_if_pending(job_id).await? {
                return Ok(Some(done));
            }
            // the timer got there first
            return self.get(job_id).await;
        }

        Ok(Some(job))
    }

    /// Completed jobs, newest first
    pub async fn list_completed(&self) -> Result<Vec<TrainingJob>, surrealdb::Error> {
        let records: Vec<TrainingRecord> = self.db.select(TRAINING_JOBS).await?;

        let mut completed: Vec<TrainingJob> = records
            .into_iter()
            .filter(|record| record.status == TrainingStatus::Completed)
            .map(TrainingJob::from)
            .collect();
        completed.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(completed)
    }

    pub async fn delete(&self, job_id: &str) -> Result<(), surrealdb::Error> {
        let removed: Option<TrainingRecord> = self.db
            .delete((TRAINING_JOBS, job_id.to_string()))
            .await?;

        if removed.is_some() {
            info!("Training job {} deleted", job_id);
        }
        Ok(())
    }

    /// Returns the updated job only when this call performed the transition
    pub async fn complete_if_pending(&self, job_id: &str) -> Result<Option<TrainingJob>, surrealdb::Error> {
        let mut response = self.db
            .query(COMPLETE_IF_PENDING)
            .bind(("tb", TRAINING_JOBS))
            .bind(("id", job_id.to_string()))
            .bind(("now", Utc::now().to_rfc3339()))
            .bind(("url", mock_model_url(job_id)))
            .await?;

        let updated: Vec<TrainingRecord> = response.take(0)?;
        let done = updated.into_iter().next().map(TrainingJob::from);
        if done.is_some() {
            info!("Training job {} completed", job_id);
        }
        Ok(done)
    }

    async fn get(&self, job_id: &str) -> Result<Option<TrainingJob>, surrealdb::Error> {
        let record: Option<TrainingRecord> = self.db.select((TRAINING_JOBS, job_id.to_string())).await?;
        Ok(record.map(TrainingJob::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::db::connect_in_memory;

    async fn store_without_timer(threshold: Duration) -> TrainingStore {
        let db = connect_in_memory().await.unwrap();
        TrainingStore::with_policy(db, Arc::new(ElapsedPolicy::new(threshold)), None)
    }

    #[tokio::test]
    async fn test_new_job_is_pending() {
        let store = store_without_timer(Duration::from_secs(3600)).await;
        let id = store.create(vec!["a.png".into()], json!({"rank": 8})).await.unwrap();
        assert!(id.starts_with("lora-training-"));

        let job = store.status(&id).await.unwrap().unwrap();
        assert_eq!(job.status, TrainingStatus::Pending);
        assert_eq!(job.progress, 0);
        assert_eq!(job.training_config["rank"], 8);
        assert!(job.model_url.is_none());
    }

    #[tokio::test]
    async fn test_lazy_completion_on_read() {
        let store = store_without_timer(Duration::ZERO).await;
        let id = store.create(vec!["a.png".into()], Value::Null).await.unwrap();

        let job = store.status(&id).await.unwrap().unwrap();
        assert_eq!(job.status, TrainingStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.completed_at.is_some());
        assert_eq!(job.model_url, Some(mock_model_url(&id)));
    }

    #[tokio::test]
    async fn test_completion_applies_once() {
        let store = store_without_timer(Duration::from_secs(3600)).await;
        let id = store.create(vec![], Value::Null).await.unwrap();

        let first = store.complete_if_pending(&id).await.unwrap();
        let second = store.complete_if_pending(&id).await.unwrap();
        assert!(first.is_some());
        assert!(second.is_none());

        let stored = store.status(&id).await.unwrap().unwrap();
        assert_eq!(stored.completed_at, first.unwrap().completed_at);
    }

    #[tokio::test]
    async fn test_timer_completes_job() {
        let db = connect_in_memory().await.unwrap();
        let store = TrainingStore::with_policy(
            db,
            Arc::new(ElapsedPolicy::new(Duration::from_secs(3600))),
            Some(Duration::from_millis(50)),
        );
        let id = store.create(vec!["a.png".into()], Value::Null).await.unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;

        let job = store.status(&id).await.unwrap().unwrap();
        assert_eq!(job.status, TrainingStatus::Completed);
        assert_eq!(store.list_completed().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_only_completed_newest_first() {
        let store = store_without_timer(Duration::from_secs(3600)).await;
        let older = store.create(vec![], Value::Null).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let newer = store.create(vec![], Value::Null).await.unwrap();
        let _pending = store.create(vec![], Value::Null).await.unwrap();

        store.complete_if_pending(&older).await.unwrap();
        store.complete_if_pending(&newer).await.unwrap();

        let ids: Vec<String> = store
            .list_completed()
            .await
            .unwrap()
            .into_iter()
            .map(|job| job.id)
            .collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_noop() {
        let store = store_without_timer(Duration::ZERO).await;
        store.delete("lora-training-missing").await.unwrap();

        let id = store.create(vec![], Value::Null).await.unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.status(&id).await.unwrap().is_none());
    }
}
