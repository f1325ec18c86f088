use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::Context;

pub const DEFAULT_LEONARDO_BASE_URL: &str = "https://cloud.leonardo.ai/api/rest/v1";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo";

#[derive(Clone)]
pub struct LeonardoConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Name of the generation provider backing the orchestrator
    pub provider: String,
    pub leonardo: LeonardoConfig,
    pub openai: OpenAiConfig,
    pub temp_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub db_path: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub lora_completion: Duration,
    /// Empty or `*` allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Read `.env` (if present) and the process environment
    pub fn load() -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("failed to read .env");
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port: u16 = var("PORT", "3000")
            .parse()
            .context("PORT must be a number")?;

        let lora_secs: u64 = var("LORA_COMPLETION_SECS", "10")
            .parse()
            .context("LORA_COMPLETION_SECS must be a whole number of seconds")?;

        Ok(Self {
            port,
            provider: var("AI_PROVIDER", "LEONARDO"),
            leonardo: LeonardoConfig {
                api_key: var("LEONARDO_API_KEY", ""),
                base_url: var("LEONARDO_BASE_URL", DEFAULT_LEONARDO_BASE_URL),
            },
            openai: OpenAiConfig {
                api_key: var("OPENAI_API_KEY", ""),
                base_url: var("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
                model: var("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            },
            temp_dir: PathBuf::from(var("EXPORT_TEMP_DIR", "temp")),
            upload_dir: PathBuf::from(var("UPLOAD_DIR", "uploads")),
            db_path: PathBuf::from(var("DB_PATH", "outputs/db")),
            ffmpeg_path: PathBuf::from(var("FFMPEG_PATH", "ffmpeg")),
            lora_completion: Duration::from_secs(lora_secs),
            cors_allowed_origins: split_origins(&var("CORS_ALLOWED_ORIGINS", "*")),
        })
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .map(str::to_string)
        .collect()
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

impl fmt::Debug for LeonardoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeonardoConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
