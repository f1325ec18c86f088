use std::io;
use std::path::{Path, PathBuf};
use log::info;
use uuid::Uuid;

const MAX_NAME_CHARS: usize = 100;

/// Directory receiving files uploaded for LoRA training
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` as `<uuid>-<name>` and return the stored path
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(format!("{}-{}", Uuid::new_v4(), safe_name(original_name)));
        tokio::fs::write(&path, bytes).await?;

        info!("Stored upload {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// Last path component of a client file name, limited to `[A-Za-z0-9._-]`
fn safe_name(original_name: Option<&str>) -> String {
    let base = original_name
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .take(MAX_NAME_CHARS)
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name(Some("cat.png")), "cat.png");
        assert_eq!(safe_name(Some("../../etc/passwd")), "passwd");
        assert_eq!(safe_name(Some("C:\\photos\\my dog.jpg")), "my_dog.jpg");
        assert_eq!(safe_name(Some("..")), "upload");
        assert_eq!(safe_name(Some(".hidden")), "hidden");
        assert_eq!(safe_name(None), "upload");
    }

    #[tokio::test]
    async fn test_save_stays_in_root() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().join("uploads"));

        let first = uploads.save(Some("../face.png"), b"one").await.unwrap();
        let second = uploads.save(Some("../face.png"), b"two").await.unwrap();

        assert_ne!(first, second);
        for path in [&first, &second] {
            assert_eq!(path.parent(), Some(uploads.root()));
            assert!(path.file_name().unwrap().to_string_lossy().ends_with("-face.png"));
        }
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }
}
