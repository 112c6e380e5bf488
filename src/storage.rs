//! Local-disk file intake for uploaded report files and profile images.
//!
//! One file per request under a named multipart field. Stored names are
//! UUIDv4 plus the original extension, so collisions are independent of
//! request timing. Lookups resolve only bare file names inside the upload
//! directory; anything that could climb out of it is rejected.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// Handle on the upload directory, created at startup and shared as state.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

/// A file written to disk by [`Storage::save_field`].
#[derive(Debug, Clone)]
pub struct SavedFile {
    /// Generated name on disk, e.g. `9f7c….pdf`.
    pub file_name: String,
    /// Public path recorded in the owning row, e.g. `uploads/9f7c….pdf`.
    pub relative_path: String,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Resolve a client-supplied file name inside the upload directory.
    /// Names carrying path separators or parent-directory segments are
    /// rejected before touching the filesystem.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf, ApiError> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name == "."
            || file_name == ".."
        {
            return Err(ApiError::validation("Invalid file name"));
        }
        Ok(self.root.join(file_name))
    }

    /// Remove a stored file given the path recorded in its row. Returns
    /// `false` (after logging) when the file is already gone.
    pub async fn remove(&self, stored_path: &str) -> Result<bool, ApiError> {
        let file_name = Path::new(stored_path)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ApiError::validation("Invalid file name"))?;
        let path = self.resolve(file_name)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(file_name, "stored file already missing from disk");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Stream one multipart field to disk under a generated name.
    pub async fn save_field(&self, field: &mut Field) -> Result<SavedFile, ApiError> {
        let original = field
            .content_disposition()
            .get_filename()
            .unwrap_or_default()
            .to_owned();
        let file_name = generated_name(&original);
        let path = self.root.join(&file_name);

        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(%original, %file_name, "upload written");
        Ok(SavedFile {
            relative_path: format!("uploads/{}", file_name),
            file_name,
        })
    }
}

/// Collect a multipart payload: the single file under `file_field` (saved to
/// disk) plus every text field. Extra files under other names are drained and
/// ignored, matching single-file upload semantics.
pub async fn read_form(
    storage: &Storage,
    mut payload: Multipart,
    file_field: &str,
) -> Result<(Option<SavedFile>, HashMap<String, String>), ApiError> {
    let mut saved: Option<SavedFile> = None;
    let mut fields = HashMap::new();

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let name = field.name().to_owned();

        if name == file_field && field.content_disposition().get_filename().is_some() {
            if saved.is_none() {
                saved = Some(storage.save_field(&mut field).await?);
            }
            continue;
        }

        let mut value = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            value.extend_from_slice(&chunk);
        }
        let value = String::from_utf8(value)
            .map_err(|_| ApiError::validation(format!("Field '{}' is not valid text", name)))?;
        fields.insert(name, value);
    }

    Ok((saved, fields))
}

fn bad_multipart(err: actix_multipart::MultipartError) -> ApiError {
    ApiError::validation(format!("Malformed multipart payload: {}", err))
}

/// UUIDv4 plus the original extension (sanitized to alphanumerics).
fn generated_name(original: &str) -> String {
    let extension = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_keep_extension_and_never_collide() {
        let a = generated_name("report.PDF");
        let b = generated_name("report.PDF");
        assert!(a.ends_with(".pdf"));
        assert_ne!(a, b);
    }

    #[test]
    fn generated_name_drops_suspicious_extensions() {
        assert!(!generated_name("x.p/df").contains('/'));
        assert!(!generated_name("noext").contains('.'));
    }

    #[test]
    fn resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("a/b.pdf").is_err());
        assert!(storage.resolve("..").is_err());
        assert!(storage.resolve("").is_err());
        assert!(storage.resolve("fine.pdf").is_ok());
    }

    #[tokio::test]
    async fn remove_reports_missing_files_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        let present = dir.path().join("there.pdf");
        tokio::fs::write(&present, b"bytes").await.unwrap();

        assert!(storage.remove("uploads/there.pdf").await.unwrap());
        assert!(!storage.remove("uploads/there.pdf").await.unwrap());
    }
}
