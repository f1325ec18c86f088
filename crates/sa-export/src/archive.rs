use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;
use crate::error::ExportError;

/// Maximum deflate level
const COMPRESSION_LEVEL: i64 = 9;

/// Pack `entries` into a zip at `dest`, each under its file name.
/// Returns the number of entries written.
pub fn write_zip(entries: &[PathBuf], dest: &Path) -> Result<usize, ExportError> {
    let file = File::create(dest)?;
    let mut zip_writer = ZipWriter::new(BufWriter::new(file));
    let zip_options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    for entry in entries {
        let name = entry
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ExportError::Validation(format!("not a file: {}", entry.display())))?;

        zip_writer.start_file(name, zip_options)?;
        let mut source = File::open(entry)?;
        io::copy(&mut source, &mut zip_writer)?;
    }

    let mut finished = zip_writer.finish()?;
    io::Write::flush(&mut finished)?;

    Ok(entries.len())
}

/// `write_zip` off the async runtime
pub async fn zip_files(entries: Vec<PathBuf>, dest: PathBuf) -> Result<usize, ExportError> {
    tokio::task::spawn_blocking(move || write_zip(&entries, &dest)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_entries_named_by_basename() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("scene_1.jpg");
        let b = dir.path().join("scene_3.jpg");
        std::fs::write(&a, b"first").unwrap();
        std::fs::write(&b, b"third").unwrap();

        let dest = dir.path().join("out.zip");
        let count = write_zip(&[a, b], &dest).unwrap();
        assert_eq!(count, 2);

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);

        let mut contents = String::new();
        archive
            .by_name("scene_3.jpg")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "third");
        assert!(archive.by_name("scene_1.jpg").is_ok());
    }

    #[tokio::test]
    async fn test_missing_entry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.zip");
        let result = zip_files(vec![dir.path().join("scene_1.jpg")], dest).await;
        assert!(matches!(result, Err(ExportError::Io(_))));
    }
}
