use anyhow::Result;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

/// On-disk store for uploaded splash media.
///
/// Files are content-addressed: each lives at `{dir}/{sha256 hex}`, so the
/// same bytes uploaded twice share one file.
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Media storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn file_path(&self, file_id: &str) -> PathBuf {
        self.dir.join(file_id)
    }

    /// Write `data` unless an identical file is already stored. Returns the
    /// file id.
    pub async fn save(&self, data: &[u8]) -> Result<String> {
        let file_id = hex::encode(Sha256::digest(data));
        let path = self.file_path(&file_id);

        if fs::try_exists(&path).await? {
            debug!("Media {} already stored", file_id);
            return Ok(file_id);
        }

        // Write under a per-writer temporary name so readers never see a
        // partial file and concurrent writers never share one
        let tmp = self.dir.join(format!("{}.{}.part", file_id, uuid::Uuid::new_v4()));
        fs::write(&tmp, data).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            if fs::try_exists(&path).await? {
                debug!("Media {} stored by a concurrent upload", file_id);
                return Ok(file_id);
            }
            return Err(e.into());
        }
        Ok(file_id)
    }

    /// Read a stored file. `None` when the id is malformed or absent.
    pub async fn read(&self, file_id: &str) -> Result<Option<Vec<u8>>> {
        if !is_valid_file_id(file_id) {
            return Ok(None);
        }
        match fs::read(self.file_path(file_id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Lower-case hex SHA-256. Guards against path traversal in `/media/{id}`.
pub fn is_valid_file_id(file_id: &str) -> bool {
    file_id.len() == 64 && file_id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_storage() -> (Storage, PathBuf) {
        let dir = std::env::temp_dir().join(format!("tidewave-media-{}", uuid::Uuid::new_v4()));
        (Storage::new(dir.clone()).await.unwrap(), dir)
    }

    #[tokio::test]
    async fn same_bytes_share_one_id() {
        let (storage, dir) = temp_storage().await;
        let a = storage.save(b"splash").await.unwrap();
        let b = storage.save(b"splash").await.unwrap();
        assert_eq!(a, b);
        assert!(is_valid_file_id(&a));
        assert_eq!(storage.read(&a).await.unwrap().unwrap(), b"splash");
        let _ = fs::remove_dir_all(dir).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_identical_saves_all_succeed() {
        let (storage, dir) = temp_storage().await;
        let storage = std::sync::Arc::new(storage);
        let data = vec![7u8; 300 * 1024];

        for _ in 0..20 {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let storage = storage.clone();
                    let data = data.clone();
                    tokio::spawn(async move { storage.save(&data).await })
                })
                .collect();
            let mut ids = Vec::new();
            for handle in handles {
                ids.push(handle.await.unwrap().unwrap());
            }
            assert!(ids.windows(2).all(|w| w[0] == w[1]));
            let _ = fs::remove_file(storage.file_path(&ids[0])).await;
        }

        let mut entries = fs::read_dir(&dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            assert!(!entry.file_name().to_string_lossy().ends_with(".part"));
        }
        let _ = fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn malformed_or_missing_ids_read_as_none() {
        let (storage, dir) = temp_storage().await;
        assert!(storage.read("../etc/passwd").await.unwrap().is_none());
        assert!(storage.read(&"0".repeat(64)).await.unwrap().is_none());
        let _ = fs::remove_dir_all(dir).await;
    }
}
