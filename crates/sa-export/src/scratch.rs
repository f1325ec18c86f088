use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Per-export staging area at `<root>/<uuid>`.
///
/// Every file the export writes is tracked so `cleanup` can remove it along
/// with the directory. Cleanup never fails; problems go to the log.
#[derive(Debug)]
pub struct ScratchDir {
    id: Uuid,
    path: PathBuf,
    files: Vec<PathBuf>,
}

impl ScratchDir {
    pub async fn create(root: &Path) -> std::io::Result<Self> {
        let id = Uuid::new_v4();
        let path = root.join(id.to_string());
        fs::create_dir_all(&path).await?;
        debug!(scratch_id = %id, path = %path.display(), "created scratch directory");

        Ok(Self {
            id,
            path,
            files: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Path of `name` inside the scratch directory, tracked for cleanup
    pub fn track(&mut self, name: &str) -> PathBuf {
        let file = self.path.join(name);
        self.files.push(file.clone());
        file
    }

    /// Remove tracked files, then the directory itself.
    ///
    /// Files that were never written (a fetch failed halfway through the
    /// scene list) are skipped silently.
    pub async fn cleanup(self) {
        let mut removed = 0usize;
        for file in &self.files {
            match fs::remove_file(file).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(
                    scratch_id = %self.id,
                    file = %file.display(),
                    error = %e,
                    "failed to remove staged file"
                ),
            }
        }

        match fs::remove_dir_all(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                scratch_id = %self.id,
                path = %self.path.display(),
                error = %e,
                "failed to remove scratch directory"
            ),
        }

        debug!(scratch_id = %self.id, removed, "scratch directory cleaned up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_is_unique_per_call() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchDir::create(root.path()).await.unwrap();
        let b = ScratchDir::create(root.path()).await.unwrap();

        assert_ne!(a.id(), b.id());
        assert!(a.path().is_dir());
        assert!(b.path().is_dir());
        assert_eq!(a.path().parent(), Some(root.path()));
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_partial_state() {
        let root = tempfile::tempdir().unwrap();
        let mut scratch = ScratchDir::create(root.path()).await.unwrap();

        let written = scratch.track("scene_1.jpg");
        fs::write(&written, b"jpeg").await.unwrap();
        let _never_written = scratch.track("scene_2.jpg");
        assert_eq!(scratch.files().len(), 2);

        let dir = scratch.path().to_path_buf();
        scratch.cleanup().await;

        assert!(!written.exists());
        assert!(!dir.exists());
        assert!(root.path().exists());
    }

    #[tokio::test]
    async fn test_cleanup_after_directory_vanished() {
        let root = tempfile::tempdir().unwrap();
        let mut scratch = ScratchDir::create(root.path()).await.unwrap();
        scratch.track("audio_x.mp3");

        fs::remove_dir_all(scratch.path()).await.unwrap();
        scratch.cleanup().await;
    }
}
