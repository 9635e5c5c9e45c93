use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use super::KeyValueStore;
use crate::error::{PanchangError, PanchangResult};

const EXTENSION: &str = "json";

/// One file per key under a namespace directory.
///
/// Files are written owner-only (0600) since the credential namespace holds
/// bearer tokens. Temp files never carry the `.json` extension, so `clear`
/// leaves a write in progress alone.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", encode_key(key), EXTENSION))
    }
}

/// Keep `[A-Za-z0-9._-]`, percent-encode everything else so distinct keys
/// never share a file.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'-' | b'_' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Write to a uniquely named owner-only temp file in `dir`, then rename it
/// over `path`. Concurrent writers of one key each get their own temp file;
/// the last rename wins.
fn replace_file(dir: &Path, path: &Path, contents: &[u8]) -> PanchangResult<()> {
    let mut tmp =
        NamedTempFile::new_in(dir).map_err(|e| storage_error("create temp file in", dir, e))?;
    tmp.write_all(contents)
        .map_err(|e| storage_error("write", tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| storage_error("rename", path, e.error))?;
    Ok(())
}

fn storage_error(action: &str, path: &Path, e: std::io::Error) -> PanchangError {
    PanchangError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> PanchangResult<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &path, e)),
        }
    }

    async fn put(&self, key: &str, value: String) -> PanchangResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| storage_error("create directory", &self.dir, e))?;

        let dir = self.dir.clone();
        let path = self.path_for(key);
        tokio::task::spawn_blocking(move || replace_file(&dir, &path, value.as_bytes()))
            .await
            .map_err(|e| PanchangError::Storage(format!("Write task failed: {}", e)))?
    }

    async fn delete(&self, key: &str) -> PanchangResult<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("delete", &path, e)),
        }
    }

    async fn clear(&self) -> PanchangResult<()> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(storage_error("list", &self.dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error("list", &self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(storage_error("delete", &path, e)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key_keeps_distinct_keys_distinct() {
        assert_eq!(encode_key("a:b"), "a%3Ab");
        assert_ne!(encode_key("a:b"), encode_key("a,b"));
        assert_eq!(encode_key("2024-03-01"), "2024-03-01");
    }

    #[tokio::test]
    async fn test_put_get_delete_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("ns"));

        assert_eq!(store.get("missing").await.unwrap(), None);
        store.delete("missing").await.unwrap();
        store.clear().await.unwrap();

        store.put("k:1", "one".into()).await.unwrap();
        store.put("k:2", "two".into()).await.unwrap();
        store.put("k:1", "uno".into()).await.unwrap();
        assert_eq!(store.get("k:1").await.unwrap().as_deref(), Some("uno"));

        store.delete("k:1").await.unwrap();
        assert_eq!(store.get("k:1").await.unwrap(), None);

        store.clear().await.unwrap();
        assert_eq!(store.get("k:2").await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.put("token", "secret".into()).await.unwrap();

        let meta = std::fs::metadata(store.path_for("token")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_to_one_key_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for round in 0..20 {
            let writers: Vec<_> = (0..8)
                .map(|writer| {
                    let store = store.clone();
                    let value = format!("{}-{}-", round, writer).repeat(4096);
                    tokio::spawn(async move { store.put("k", value).await })
                })
                .collect();

            for writer in writers {
                writer.await.unwrap().unwrap();
            }

            let stored = store.get("k").await.unwrap().unwrap();
            let prefix = format!("{}-", round);
            assert!(stored.starts_with(&prefix), "round {round} read {}", &stored[..16]);
            assert_eq!(stored.len() % 4096, 0);
        }

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1, "{leftovers:?}");
    }
}
