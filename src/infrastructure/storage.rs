//! On-disk storage for uploaded images
//!
//! Every user owns one folder under the upload root, named from their id and a
//! sanitized username. Listings owned by the user live below it:
//!
//! ```text
//! {root}/{id}_{username}/profile/{uuid}.png
//! {root}/{id}_{username}/artists/{artist_id}/profile/{uuid}.jpg
//! {root}/{id}_{username}/artists/{artist_id}/gallery/{uuid}.webp
//! ```
//!
//! Stored references are the path relative to the root, always with `/`.

use std::path::{Component, Path, PathBuf};

use image::ImageFormat;
use unicode_normalization::UnicodeNormalization;

use crate::domain::{DomainError, MediaKind};

const MAX_FOLDER_NAME_CHARS: usize = 40;

/// Which image slot of an owner an upload goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Profile,
    Gallery,
}

impl Slot {
    fn as_str(&self) -> &'static str {
        match self {
            Slot::Profile => "profile",
            Slot::Gallery => "gallery",
        }
    }
}

/// Reduce a username to a filesystem-safe ASCII slug
pub fn sanitize_username(username: &str) -> String {
    let mut slug = String::with_capacity(username.len());
    let mut pending_sep = false;

    for c in username.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    slug.truncate(MAX_FOLDER_NAME_CHARS);
    let slug = slug.trim_end_matches('_').to_string();
    if slug.is_empty() {
        "user".to_string()
    } else {
        slug
    }
}

/// Folder owned by a user: `{user_id}_{sanitized_username}`
pub fn user_folder(user_id: i32, username: &str) -> String {
    format!("{}_{}", user_id, sanitize_username(username))
}

/// Relative directory holding everything stored for one owner
pub fn owner_dir(folder: &str, kind: MediaKind, id: i32) -> String {
    match kind.segment() {
        Some(segment) => format!("{}/{}/{}", folder, segment, id),
        None => folder.to_string(),
    }
}

/// Relative directory for one slot of one owner
pub fn slot_dir(folder: &str, kind: MediaKind, id: i32, slot: Slot) -> String {
    format!("{}/{}", owner_dir(folder, kind, id), slot.as_str())
}

/// Extension for an accepted image, judged from its leading bytes
pub fn sniff_extension(bytes: &[u8]) -> Result<&'static str, DomainError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok("png"),
        Ok(ImageFormat::Jpeg) => Ok("jpg"),
        Ok(ImageFormat::Gif) => Ok("gif"),
        Ok(ImageFormat::WebP) => Ok("webp"),
        _ => Err(DomainError::validation(
            "Unsupported image type. Allowed: PNG, JPEG, GIF, WebP",
        )),
    }
}

fn is_plain(rel: &Path) -> bool {
    rel.components().all(|c| matches!(c, Component::Normal(_)))
}

/// True when `rel` is a plain relative path below a folder of `user_id`.
/// Ownership follows the id prefix so renamed users keep their old files.
fn is_owned_by(user_id: i32, rel: &str) -> bool {
    let path = Path::new(rel);
    let prefix = format!("{}_", user_id);
    let in_folder = path
        .components()
        .next()
        .and_then(|c| c.as_os_str().to_str())
        .is_some_and(|first| first.starts_with(&prefix));
    is_plain(path) && in_folder && path.components().count() > 1
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    max_upload_bytes: usize,
    max_gallery_images: usize,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, max_upload_bytes: usize, max_gallery_images: usize) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes,
            max_gallery_images,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn max_gallery_images(&self) -> usize {
        self.max_gallery_images
    }

    /// Reject empty, oversized or non-image payloads; returns the extension
    pub fn check(&self, bytes: &[u8]) -> Result<&'static str, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::validation("Uploaded file is empty"));
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(DomainError::PayloadTooLarge(format!(
                "Images are limited to {} bytes",
                self.max_upload_bytes
            )));
        }
        sniff_extension(bytes)
    }

    /// Write an image under `rel_dir` and return its relative path.
    /// The file is written to a temporary name first and renamed into place.
    pub async fn store(&self, rel_dir: &str, bytes: &[u8]) -> Result<String, DomainError> {
        let ext = self.check(bytes)?;
        let dir = self.root.join(rel_dir);
        tokio::fs::create_dir_all(&dir).await?;

        let id = uuid::Uuid::new_v4();
        let tmp = dir.join(format!(".{}.tmp", id));
        let file_name = format!("{}.{}", id, ext);

        tokio::fs::write(&tmp, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, dir.join(&file_name)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!("Stored {} ({} bytes)", file_name, bytes.len());
        Ok(format!("{}/{}", rel_dir, file_name))
    }

    /// Delete a stored file belonging to `user_id`.
    /// Returns false without touching the disk when the path is not theirs.
    pub async fn remove(&self, user_id: i32, rel: &str) -> Result<bool, DomainError> {
        if !is_owned_by(user_id, rel) {
            tracing::warn!("Refusing to delete '{}' for user {}", rel, user_id);
            return Ok(false);
        }

        match tokio::fs::remove_file(self.root.join(rel)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a whole listing directory, best effort
    pub async fn remove_dir(&self, rel_dir: &str) {
        if rel_dir.is_empty() || !is_plain(Path::new(rel_dir)) {
            return;
        }

        match tokio::fs::remove_dir_all(self.root.join(rel_dir)).await {
            Ok(()) => tracing::debug!("Removed upload directory {}", rel_dir),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove upload directory {}: {}", rel_dir, e),
        }
    }

    /// Remove every folder a user ever owned (`{id}_*`), best effort
    pub async fn remove_user_folders(&self, user_id: i32) {
        let prefix = format!("{}_", user_id);
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(_) => return,
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            if let Some(name) = name.to_str()
                && name.starts_with(&prefix)
            {
                self.remove_dir(name).await;
            }
        }
    }
}
