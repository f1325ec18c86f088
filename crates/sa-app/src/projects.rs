use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

const PROJECTS: &str = "projects";

const NAME_CHARS: std::ops::RangeInclusive<usize> = 2..=50;
const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ProjectRecord {
    project_id: String,
    name: String,
    description: Option<String>,
    category: Option<String>,
    #[serde(default)]
    generated_contents: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// A shorts project as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub generated_contents: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: record.project_id,
            name: record.name,
            description: record.description,
            category: record.category,
            generated_contents: record.generated_contents,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl NewProject {
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_description(self.description.as_deref())
    }
}

/// Partial update. `generated_content_url` is added to the project's
/// generated contents unless it is already there.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub generated_content_url: Option<String>,
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_description(self.description.as_deref())
    }

    fn apply(self, record: &mut ProjectRecord, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(description) = self.description {
            record.description = Some(description);
        }
        if let Some(category) = self.category {
            record.category = Some(category);
        }
        if let Some(url) = self.generated_content_url.filter(|url| !url.trim().is_empty()) {
            if !record.generated_contents.contains(&url) {
                record.generated_contents.push(url);
            }
        }
        record.updated_at = now;
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if !NAME_CHARS.contains(&len) {
        return Err(format!(
            "name must be between {} and {} characters",
            NAME_CHARS.start(),
            NAME_CHARS.end()
        ));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), String> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_CHARS => Err(format!(
            "description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct ProjectStore {
    db: Surreal<Db>,
}

impl ProjectStore {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// All projects, newest first
    pub async fn list(&self) -> Result<Vec<Project>, surrealdb::Error> {
        let mut records: Vec<ProjectRecord> = self.db.select(PROJECTS).await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records.into_iter().map(Project::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Project>, surrealdb::Error> {
        Ok(self.record(id).await?.map(Project::from))
    }

    pub async fn create(&self, new: NewProject) -> Result<Project, surrealdb::Error> {
        let now = Utc::now();
        let record = ProjectRecord {
            project_id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            description: new.description,
            category: new.category.filter(|c| !c.is_empty()),
            generated_contents: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let created: Option<ProjectRecord> = self.db
            .create((PROJECTS, record.project_id.clone()))
            .content(record.clone())
            .await?;

        info!("Project {} created", record.project_id);
        Ok(Project::from(created.unwrap_or(record)))
    }

    /// `None` when the project does not exist
    pub async fn update(&self, id: &str, patch: ProjectPatch) -> Result<Option<Project>, surrealdb::Error> {
        let Some(mut record) = self.record(id).await? else {
            return Ok(None);
        };

        patch.apply(&mut record, Utc::now());

        let updated: Option<ProjectRecord> = self.db
            .update((PROJECTS, id.to_string()))
            .content(record)
            .await?;

        Ok(updated.map(Project::from))
    }

    pub async fn delete(&self, id: &str) -> Result<(), surrealdb::Error> {
        let _: Option<ProjectRecord> = self.db
            .delete((PROJECTS, id.to_string()))
            .await?;
        Ok(())
    }

    async fn record(&self, id: &str) -> Result<Option<ProjectRecord>, surrealdb::Error> {
        self.db.select((PROJECTS, id.to_string())).await
    }
}
