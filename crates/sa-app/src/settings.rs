use std::fmt;
use log::info;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const SETTINGS: &str = "settings";
const API_KEYS: &str = "api_keys";

const VISIBLE_SUFFIX: usize = 4;

/// Provider keys saved from the settings page
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leonardo_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

impl ApiKeys {
    /// Keys present in `patch` replace ours. Empty strings are ignored.
    fn merge(&mut self, patch: ApiKeys) {
        let keep = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        if let Some(key) = keep(patch.leonardo_api_key) {
            self.leonardo_api_key = Some(key);
        }
        if let Some(key) = keep(patch.openai_api_key) {
            self.openai_api_key = Some(key);
        }
    }

    /// Copy safe to send back to a client: only the last characters stay readable
    pub fn masked(&self) -> ApiKeys {
        ApiKeys {
            leonardo_api_key: self.leonardo_api_key.as_deref().map(mask),
            openai_api_key: self.openai_api_key.as_deref().map(mask),
        }
    }
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= VISIBLE_SUFFIX * 2 {
        return "*".repeat(chars.len());
    }
    let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - VISIBLE_SUFFIX), suffix)
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("leonardo_api_key", &self.leonardo_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone)]
pub struct SettingsStore {
    db: Surreal<Db>,
}

impl SettingsStore {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Empty when nothing was saved yet
    pub async fn api_keys(&self) -> Result<ApiKeys, surrealdb::Error> {
        let stored: Option<ApiKeys> = self.db.select((SETTINGS, API_KEYS)).await?;
        Ok(stored.unwrap_or_default())
    }

    /// Merge `patch` into the saved keys and return the full result
    pub async fn update_api_keys(&self, patch: ApiKeys) -> Result<ApiKeys, surrealdb::Error> {
        let mut keys = self.api_keys().await?;
        keys.merge(patch);

        let saved: Option<ApiKeys> = self.db
            .upsert((SETTINGS, API_KEYS))
            .content(keys.clone())
            .await?;

        info!(
            "API keys updated (leonardo: {}, openai: {})",
            keys.leonardo_api_key.is_some(),
            keys.openai_api_key.is_some()
        );
        Ok(saved.unwrap_or(keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn keys(leonardo: Option<&str>, openai: Option<&str>) -> ApiKeys {
        ApiKeys {
            leonardo_api_key: leonardo.map(str::to_string),
            openai_api_key: openai.map(str::to_string),
        }
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("sk-abcdefgh1234"), "***********1234");
        assert_eq!(mask("short"), "*****");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn test_debug_hides_keys() {
        let printed = format!("{:?}", keys(Some("leo-secret-123"), None));
        assert!(!printed.contains("leo-secret-123"));
        assert!(printed.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_empty_before_first_save() {
        let store = SettingsStore::new(connect_in_memory().await.unwrap());
        assert_eq!(store.api_keys().await.unwrap(), ApiKeys::default());
        assert_eq!(serde_json::to_value(ApiKeys::default()).unwrap(), serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_update_merges() {
        let store = SettingsStore::new(connect_in_memory().await.unwrap());
        store.update_api_keys(keys(Some("leo-1"), None)).await.unwrap();
        let merged = store.update_api_keys(keys(None, Some("sk-2"))).await.unwrap();
        assert_eq!(merged, keys(Some("leo-1"), Some("sk-2")));

        let unchanged = store.update_api_keys(keys(Some(""), None)).await.unwrap();
        assert_eq!(unchanged.leonardo_api_key.as_deref(), Some("leo-1"));
        assert_eq!(store.api_keys().await.unwrap(), merged);
    }
}
