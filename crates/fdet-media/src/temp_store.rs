//! Scoped temporary files.
//!
//! Every file handed out here is owned by a guard and removed from disk when
//! the guard is dropped, whether the surrounding step succeeded or returned
//! early with an error. Names carry a random suffix so concurrent requests
//! sharing a directory never collide.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::{MediaError, MediaResult};

/// Prefix of persisted uploads.
const UPLOAD_PREFIX: &str = "image";

/// Creates temporary files under a fixed directory.
#[derive(Debug, Clone)]
pub struct TempStore {
    dir: PathBuf,
}

impl TempStore {
    /// Store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the system temp directory.
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Copy `reader` into a fresh temporary file.
    pub fn persist<R: Read>(&self, reader: &mut R) -> MediaResult<TempImage> {
        let mut file = self.scratch(UPLOAD_PREFIX, "")?;

        let bytes = io::copy(reader, &mut file)
            .and_then(|n| file.flush().map(|_| n))
            .map_err(|e| MediaError::temp_file_write(e.to_string()))?;

        debug!(path = %file.path().display(), bytes, "Persisted upload to temp file");

        Ok(TempImage { file })
    }

    /// Empty temporary file named `<prefix><random><suffix>`.
    pub fn scratch(&self, prefix: &str, suffix: &str) -> MediaResult<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.dir)
            .map_err(|e| {
                MediaError::temp_file_create(format!("{}: {}", self.dir.display(), e))
            })
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::system()
    }
}

/// A persisted upload; the file is deleted when this value is dropped.
#[derive(Debug)]
pub struct TempImage {
    file: NamedTempFile,
}

impl TempImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        trace!(path = %self.file.path().display(), "Removing temp file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_persist_writes_content() {
        let dir = TempDir::new().unwrap();
        let store = TempStore::new(dir.path());

        let image = store.persist(&mut &b"raw upload bytes"[..]).unwrap();

        assert!(image.path().starts_with(dir.path()));
        assert_eq!(std::fs::read(image.path()).unwrap(), b"raw upload bytes");
    }

    #[test]
    fn test_persisted_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let store = TempStore::new(dir.path());

        let image = store.persist(&mut &b"abc"[..]).unwrap();
        let path = image.path().to_path_buf();
        assert!(path.exists());

        drop(image);
        assert!(!path.exists());
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_names_are_unique() {
        let dir = TempDir::new().unwrap();
        let store = TempStore::new(dir.path());

        let a = store.persist(&mut &b"a"[..]).unwrap();
        let b = store.persist(&mut &b"b"[..]).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(entries(dir.path()), 2);
    }

    #[test]
    fn test_scratch_suffix() {
        let dir = TempDir::new().unwrap();
        let store = TempStore::new(dir.path());

        let file = store.scratch("annotated", ".jpg").unwrap();
        let name = file.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("annotated"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_missing_directory_is_create_error() {
        let dir = TempDir::new().unwrap();
        let store = TempStore::new(dir.path().join("does-not-exist"));

        let err = store.persist(&mut &b"abc"[..]).unwrap_err();
        assert!(matches!(err, MediaError::TempFileCreate(_)));
        assert!(err.is_storage());
    }

    #[test]
    fn test_failing_reader_is_write_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "stream reset"))
            }
        }

        let dir = TempDir::new().unwrap();
        let store = TempStore::new(dir.path());

        let err = store.persist(&mut Broken).unwrap_err();
        assert!(matches!(err, MediaError::TempFileWrite(_)));
        // The half-written file is dropped with the error.
        assert_eq!(entries(dir.path()), 0);
    }
}
