//! Uploaded file storage
//!
//! Files are stored under `<upload_dir>/<session_id>/<uuid><orig-ext>`.
//! The generated name is collision-resistant across concurrent uploads;
//! the original extension is preserved so extractors and format probes can
//! still use it as a hint.

use lectern_common::Result;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Clone)]
pub struct FileStorage {
    upload_dir: PathBuf,
}

impl FileStorage {
    pub fn new(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    /// Create the upload directory if missing
    pub fn init(&self) -> Result<()> {
        lectern_common::config::ensure_directory_exists(&self.upload_dir)
    }

    /// Directory holding one session's files
    pub fn session_dir(&self, session_id: Uuid) -> PathBuf {
        self.upload_dir.join(session_id.to_string())
    }

    /// Persist one uploaded file; returns (storage path, byte size)
    pub async fn save(
        &self,
        session_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<(String, i64)> {
        let session_dir = self.session_dir(session_id);
        tokio::fs::create_dir_all(&session_dir).await?;

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let stored_name = format!("{}{}", Uuid::new_v4(), extension);
        let file_path = session_dir.join(stored_name);

        tokio::fs::write(&file_path, bytes).await?;

        Ok((file_path.to_string_lossy().into_owned(), bytes.len() as i64))
    }

    /// Remove all stored files for a session
    pub async fn cleanup_session(&self, session_id: Uuid) -> Result<()> {
        let session_dir = self.session_dir(session_id);
        if session_dir.exists() {
            tokio::fs::remove_dir_all(&session_dir).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_preserves_extension_and_size() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().join("uploads"));
        storage.init().unwrap();

        let session_id = Uuid::new_v4();
        let (path, size) = storage
            .save(session_id, "My Notes.PDF", b"hello")
            .await
            .unwrap();

        assert_eq!(size, 5);
        assert!(path.ends_with(".PDF"), "{path}");
        assert!(path.contains(&session_id.to_string()));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn concurrent_saves_never_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().to_owned());
        let session_id = Uuid::new_v4();

        let (a, _) = storage.save(session_id, "same.pdf", b"a").await.unwrap();
        let (b, _) = storage.save(session_id, "same.pdf", b"b").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn cleanup_removes_session_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().to_owned());
        let session_id = Uuid::new_v4();

        storage.save(session_id, "x.pdf", b"x").await.unwrap();
        assert!(storage.session_dir(session_id).exists());

        storage.cleanup_session(session_id).await.unwrap();
        assert!(!storage.session_dir(session_id).exists());
    }
}
