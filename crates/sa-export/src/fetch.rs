use std::path::Path;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use crate::error::FetchError;

const DEFAULT_AUDIO_EXTENSION: &str = "mp3";

/// Downloads remote assets into local scratch storage
#[derive(Debug, Clone, Default)]
pub struct AssetFetcher {
    client: reqwest::Client,
}

impl AssetFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Stream `url` into `dest`, returning the number of bytes written
    pub async fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let write_err = |source| FetchError::Write {
            path: dest.to_path_buf(),
            source,
        };

        let mut file = File::create(dest).await.map_err(write_err)?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;

        debug!(url, dest = %dest.display(), bytes = written, "fetched asset");
        Ok(written)
    }
}

/// Extension of the last path segment of `url`, ignoring query and fragment.
/// Falls back to `mp3` when the URL carries no usable extension.
pub fn audio_extension(url: &str) -> String {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    path.rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_AUDIO_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_ignores_query() {
        assert_eq!(audio_extension("https://cdn.example.com/a/track.wav?sig=abc.def"), "wav");
        assert_eq!(audio_extension("https://cdn.example.com/track.M4A#t=3"), "m4a");
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(audio_extension("https://cdn.example.com/stream"), "mp3");
        assert_eq!(audio_extension("https://cdn.example.com.evil/"), "mp3");
        assert_eq!(audio_extension("https://cdn.example.com/a.b/c"), "mp3");
        assert_eq!(audio_extension("not a url/song.ogg?x=1"), "ogg");
    }
}
