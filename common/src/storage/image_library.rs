use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;

use crate::error::AppError;

/// Extension every stored image carries, regardless of the source format.
pub const STORED_IMAGE_EXTENSION: &str = "png";

/// Flat directory of `<source-id>.png` files.
///
/// The directory is the source of truth for which images exist. Nothing is
/// cached; every query goes back to the filesystem so readers observe the
/// pipeline's writes as soon as they land.
#[derive(Clone, Debug)]
pub struct ImageLibrary {
    dir: PathBuf,
}

impl ImageLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory (and parents) if it does not exist yet.
    pub async fn ensure_exists(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// File name a source record with `source_id` is stored under.
    pub fn file_name_for(source_id: u64) -> String {
        format!("{source_id}.{STORED_IMAGE_EXTENSION}")
    }

    /// Full path a source record with `source_id` is stored under.
    pub fn path_for(&self, source_id: u64) -> PathBuf {
        self.dir.join(Self::file_name_for(source_id))
    }

    /// Whether the image for `source_id` has already been stored.
    pub async fn is_stored(&self, source_id: u64) -> Result<bool, AppError> {
        Ok(tokio::fs::try_exists(self.path_for(source_id)).await?)
    }

    /// List the stored image file names in directory-listing order.
    ///
    /// Returns `AppError::NotFound` when the directory itself is missing. An
    /// existing but empty directory yields an empty list.
    pub async fn list_image_files(&self) -> Result<Vec<String>, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!(
                    "image directory {}",
                    self.dir.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };

        let suffix = format!(".{STORED_IMAGE_EXTENSION}");
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.ends_with(&suffix) {
                files.push(name);
            }
        }

        Ok(files)
    }

    /// Pick one stored image at random, `None` if the library is empty.
    pub async fn random_image(&self) -> Result<Option<String>, AppError> {
        let files = self.list_image_files().await?;
        Ok(pick_random(&files).cloned())
    }
}

/// Scratch path `path` is written through. The suffix keeps it out of
/// `list_image_files`.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Write `bytes` to `path` via a scratch file renamed over the final name, so
/// an interrupted write never leaves a truncated image under `path`.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let partial = partial_path(path);

    if let Err(err) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(err.into());
    }
    tokio::fs::rename(&partial, path).await?;

    Ok(())
}

/// Uniformly choose one element of `files`.
pub fn pick_random(files: &[String]) -> Option<&String> {
    files.choose(&mut rand::thread_rng())
}
