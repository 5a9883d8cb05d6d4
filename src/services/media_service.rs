//! Media Service - profile pictures and listing galleries
//!
//! Files go to disk first and the row is updated afterwards. If the row update
//! fails the new files are removed again, so the JSON columns never point at
//! files that were not written.

use crate::domain::{DomainError, ListingKind, MediaKind, MediaRecord, MediaRepository};
use crate::infrastructure::storage::{self, MediaStorage, Slot};

fn label(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::User => "User",
        MediaKind::Listing(ListingKind::Artist) => "Artist",
        MediaKind::Listing(ListingKind::Venue) => "Venue",
        MediaKind::Listing(ListingKind::Event) => "Event",
    }
}

/// Load the media of a row the caller owns
async fn owned_record(
    repo: &dyn MediaRepository,
    kind: MediaKind,
    id: i32,
    caller_id: i32,
) -> Result<MediaRecord, DomainError> {
    let record = repo
        .find_media(kind, id)
        .await?
        .ok_or_else(|| DomainError::not_found(label(kind)))?;

    if record.owner_user_id != caller_id {
        return Err(DomainError::forbidden(
            "Only the owner can change these images",
        ));
    }
    Ok(record)
}

async fn discard(storage: &MediaStorage, owner_id: i32, paths: &[String]) {
    for path in paths {
        if let Err(e) = storage.remove(owner_id, path).await {
            tracing::warn!("Failed to remove {}: {}", path, e);
        }
    }
}

/// Store a new profile picture (poster for events) and drop the old file
pub async fn set_profile_picture(
    repo: &dyn MediaRepository,
    storage: &MediaStorage,
    kind: MediaKind,
    id: i32,
    caller_id: i32,
    bytes: &[u8],
) -> Result<String, DomainError> {
    let record = owned_record(repo, kind, id, caller_id).await?;
    let folder = storage::user_folder(record.owner_user_id, &record.owner_username);

    let stored = storage
        .store(&storage::slot_dir(&folder, kind, id, Slot::Profile), bytes)
        .await?;

    if let Err(e) = repo
        .save_media(kind, id, Some(stored.clone()), &record.gallery)
        .await
    {
        discard(storage, record.owner_user_id, std::slice::from_ref(&stored)).await;
        return Err(e);
    }

    if let Some(old) = record.profile_picture {
        discard(storage, record.owner_user_id, &[old]).await;
    }

    tracing::info!("{} {} has a new profile picture", label(kind), id);
    Ok(stored)
}

/// Append images to a listing gallery; returns the whole gallery
pub async fn add_gallery_images(
    repo: &dyn MediaRepository,
    storage: &MediaStorage,
    kind: ListingKind,
    id: i32,
    caller_id: i32,
    files: &[Vec<u8>],
) -> Result<Vec<String>, DomainError> {
    if files.is_empty() {
        return Err(DomainError::validation("No files uploaded"));
    }

    let kind = MediaKind::from(kind);
    let record = owned_record(repo, kind, id, caller_id).await?;

    let limit = storage.max_gallery_images();
    if record.gallery.len() + files.len() > limit {
        return Err(DomainError::Validation(format!(
            "A gallery holds at most {} images ({} already stored)",
            limit,
            record.gallery.len()
        )));
    }

    // Reject the whole batch before anything touches the disk
    for bytes in files {
        storage.check(bytes)?;
    }

    let folder = storage::user_folder(record.owner_user_id, &record.owner_username);
    let dir = storage::slot_dir(&folder, kind, id, Slot::Gallery);

    let mut written = Vec::with_capacity(files.len());
    for bytes in files {
        match storage.store(&dir, bytes).await {
            Ok(path) => written.push(path),
            Err(e) => {
                discard(storage, record.owner_user_id, &written).await;
                return Err(e);
            }
        }
    }

    let mut gallery = record.gallery;
    gallery.extend(written.iter().cloned());

    if let Err(e) = repo
        .save_media(kind, id, record.profile_picture, &gallery)
        .await
    {
        discard(storage, record.owner_user_id, &written).await;
        return Err(e);
    }

    tracing::info!(
        "Added {} image(s) to {} {} gallery",
        written.len(),
        label(kind),
        id
    );
    Ok(gallery)
}

/// Remove one entry from a listing gallery and delete its file
pub async fn remove_gallery_image(
    repo: &dyn MediaRepository,
    storage: &MediaStorage,
    kind: ListingKind,
    id: i32,
    caller_id: i32,
    path: &str,
) -> Result<Vec<String>, DomainError> {
    let kind = MediaKind::from(kind);
    let record = owned_record(repo, kind, id, caller_id).await?;

    let mut gallery = record.gallery;
    let Some(index) = gallery.iter().position(|p| p == path) else {
        return Err(DomainError::NotFound(
            "Image not found in gallery".to_string(),
        ));
    };
    let removed = gallery.remove(index);

    repo.save_media(kind, id, record.profile_picture, &gallery)
        .await?;

    if !storage.remove(record.owner_user_id, &removed).await? {
        tracing::warn!("Gallery entry {} had no file to delete", removed);
    }

    Ok(gallery)
}

/// Upload directory of a listing, resolved before the row is deleted
pub async fn listing_dir(
    repo: &dyn MediaRepository,
    kind: ListingKind,
    id: i32,
) -> Result<Option<String>, DomainError> {
    let kind = MediaKind::from(kind);
    Ok(repo.find_media(kind, id).await?.map(|record| {
        let folder = storage::user_folder(record.owner_user_id, &record.owner_username);
        storage::owner_dir(&folder, kind, id)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[derive(Default)]
    struct FakeMedia {
        rows: Mutex<HashMap<(MediaKind, i32), MediaRecord>>,
    }

    impl FakeMedia {
        fn with_artist(id: i32, owner: i32) -> Self {
            let fake = Self::default();
            fake.rows.lock().unwrap().insert(
                (MediaKind::Listing(ListingKind::Artist), id),
                MediaRecord {
                    owner_user_id: owner,
                    owner_username: "Ana Tijoux".to_string(),
                    profile_picture: None,
                    gallery: Vec::new(),
                },
            );
            fake
        }

        fn gallery(&self, id: i32) -> Vec<String> {
            self.rows.lock().unwrap()[&(MediaKind::Listing(ListingKind::Artist), id)]
                .gallery
                .clone()
        }
    }

    #[async_trait]
    impl MediaRepository for FakeMedia {
        async fn find_media(
            &self,
            kind: MediaKind,
            id: i32,
        ) -> Result<Option<MediaRecord>, DomainError> {
            Ok(self.rows.lock().unwrap().get(&(kind, id)).cloned())
        }

        async fn save_media(
            &self,
            kind: MediaKind,
            id: i32,
            profile_picture: Option<String>,
            gallery: &[String],
        ) -> Result<(), DomainError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.get_mut(&(kind, id)).unwrap();
            row.profile_picture = profile_picture;
            row.gallery = gallery.to_vec();
            Ok(())
        }
    }

    fn storage(max_gallery: usize) -> MediaStorage {
        let root = std::env::temp_dir().join(format!("mygigguide-media-{}", uuid::Uuid::new_v4()));
        MediaStorage::new(root, 1024, max_gallery)
    }

    #[tokio::test]
    async fn gallery_add_then_remove() {
        let repo = FakeMedia::with_artist(3, 1);
        let storage = storage(4);

        let gallery = add_gallery_images(
            &repo,
            &storage,
            ListingKind::Artist,
            3,
            1,
            &[PNG.to_vec(), PNG.to_vec()],
        )
        .await
        .unwrap();
        assert_eq!(gallery.len(), 2);
        assert!(gallery[0].starts_with("1_ana_tijoux/artists/3/gallery/"));

        let left = remove_gallery_image(&repo, &storage, ListingKind::Artist, 3, 1, &gallery[0])
            .await
            .unwrap();
        assert_eq!(left, vec![gallery[1].clone()]);
        assert_eq!(repo.gallery(3), left);
        assert!(!storage.root().join(&gallery[0]).exists());
        assert!(storage.root().join(&gallery[1]).exists());

        let err = remove_gallery_image(&repo, &storage, ListingKind::Artist, 3, 1, &gallery[0])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn gallery_cap_rejects_without_writing() {
        let repo = FakeMedia::with_artist(3, 1);
        let storage = storage(2);

        let err = add_gallery_images(
            &repo,
            &storage,
            ListingKind::Artist,
            3,
            1,
            &[PNG.to_vec(), PNG.to_vec(), PNG.to_vec()],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(repo.gallery(3).is_empty());
        assert!(!storage.root().exists());
    }

    #[tokio::test]
    async fn one_bad_file_rejects_the_batch() {
        let repo = FakeMedia::with_artist(3, 1);
        let storage = storage(5);

        let err = add_gallery_images(
            &repo,
            &storage,
            ListingKind::Artist,
            3,
            1,
            &[PNG.to_vec(), b"not an image".to_vec()],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(!storage.root().exists());
    }

    #[tokio::test]
    async fn strangers_cannot_touch_media() {
        let repo = FakeMedia::with_artist(3, 1);
        let storage = storage(5);

        let err = set_profile_picture(
            &repo,
            &storage,
            ListingKind::Artist.into(),
            3,
            2,
            PNG,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn replacing_a_picture_removes_the_old_file() {
        let repo = FakeMedia::with_artist(3, 1);
        let storage = storage(5);
        let kind = MediaKind::Listing(ListingKind::Artist);

        let first = set_profile_picture(&repo, &storage, kind, 3, 1, PNG).await.unwrap();
        let second = set_profile_picture(&repo, &storage, kind, 3, 1, PNG).await.unwrap();

        assert_ne!(first, second);
        assert!(!storage.root().join(&first).exists());
        assert!(storage.root().join(&second).exists());
        assert_eq!(
            listing_dir(&repo, ListingKind::Artist, 3).await.unwrap().as_deref(),
            Some("1_ana_tijoux/artists/3")
        );
    }
}
