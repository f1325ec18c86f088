use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

const PROMPTS: &str = "prompts";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptRecord {
    prompt_id: String,
    name: String,
    content: String,
    created_at: DateTime<Utc>,
}

/// A saved prompt the user can reuse for generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<PromptRecord> for Prompt {
    fn from(record: PromptRecord) -> Self {
        Self {
            id: record.prompt_id,
            name: record.name,
            content: record.content,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPrompt {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

impl NewPrompt {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("content is required".to_string());
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PromptStore {
    db: Surreal<Db>,
}

impl PromptStore {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Oldest first
    pub async fn list(&self) -> Result<Vec<Prompt>, surrealdb::Error> {
        let mut records: Vec<PromptRecord> = self.db.select(PROMPTS).await?;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records.into_iter().map(Prompt::from).collect())
    }

    pub async fn create(&self, new: NewPrompt) -> Result<Prompt, surrealdb::Error> {
        let record = PromptRecord {
            prompt_id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            content: new.content,
            created_at: Utc::now(),
        };

        let created: Option<PromptRecord> = self.db
            .create((PROMPTS, record.prompt_id.clone()))
            .content(record.clone())
            .await?;

        info!("Prompt {} saved", record.prompt_id);
        Ok(Prompt::from(created.unwrap_or(record)))
    }

    pub async fn delete(&self, id: &str) -> Result<(), surrealdb::Error> {
        let _: Option<PromptRecord> = self.db
            .delete((PROMPTS, id.to_string()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[test]
    fn test_validation() {
        let ok = NewPrompt { name: "Sunset".into(), content: "golden hour beach".into() };
        assert!(ok.validate().is_ok());

        let no_content = NewPrompt { name: "Sunset".into(), content: " ".into() };
        assert_eq!(no_content.validate().unwrap_err(), "content is required");

        let no_name = NewPrompt { name: String::new(), content: "x".into() };
        assert_eq!(no_name.validate().unwrap_err(), "name is required");
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let store = PromptStore::new(connect_in_memory().await.unwrap());
        let saved = store
            .create(NewPrompt { name: "Sunset".into(), content: "golden hour beach".into() })
            .await
            .unwrap();

        assert_eq!(store.list().await.unwrap(), vec![saved.clone()]);

        store.delete(&saved.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
