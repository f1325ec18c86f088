use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

const TEMPLATES: &str = "templates";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateRecord {
    template_id: String,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TemplateRecord> for Template {
    fn from(record: TemplateRecord) -> Self {
        Self {
            id: record.template_id,
            name: record.name,
            description: record.description,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplate {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

impl NewTemplate {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct TemplateStore {
    db: Surreal<Db>,
}

impl TemplateStore {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Oldest first
    pub async fn list(&self) -> Result<Vec<Template>, surrealdb::Error> {
        let mut records: Vec<TemplateRecord> = self.db.select(TEMPLATES).await?;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records.into_iter().map(Template::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Template>, surrealdb::Error> {
        let record: Option<TemplateRecord> = self.db.select((TEMPLATES, id.to_string())).await?;
        Ok(record.map(Template::from))
    }

    pub async fn create(&self, new: NewTemplate) -> Result<Template, surrealdb::Error> {
        let record = TemplateRecord {
            template_id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            description: new.description,
            created_at: Utc::now(),
        };

        let created: Option<TemplateRecord> = self.db
            .create((TEMPLATES, record.template_id.clone()))
            .content(record.clone())
            .await?;

        info!("Template {} created", record.template_id);
        Ok(Template::from(created.unwrap_or(record)))
    }

    pub async fn delete(&self, id: &str) -> Result<(), surrealdb::Error> {
        let _: Option<TemplateRecord> = self.db
            .delete((TEMPLATES, id.to_string()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn new_template(name: &str) -> NewTemplate {
        NewTemplate { name: name.to_string(), description: Some("three scenes, upbeat".into()) }
    }

    #[test]
    fn test_name_required() {
        assert!(new_template("Travel vlog").validate().is_ok());
        assert!(new_template("   ").validate().is_err());
    }

    #[tokio::test]
    async fn test_crud() {
        let store = TemplateStore::new(connect_in_memory().await.unwrap());
        let first = store.create(new_template(" Travel vlog ")).await.unwrap();
        let second = store.create(new_template("Recipe")).await.unwrap();
        assert_eq!(first.name, "Travel vlog");

        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Travel vlog", "Recipe"]);

        let fetched = store.get(&second.id).await.unwrap().unwrap();
        assert_eq!(fetched, second);

        store.delete(&first.id).await.unwrap();
        assert!(store.get(&first.id).await.unwrap().is_none());
        store.delete("missing").await.unwrap();
    }
}
