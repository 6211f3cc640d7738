//! File-backed session store
//!
//! One JSON document per call under a directory. Writes go to a temporary
//! file in the same directory which is then renamed over the target, so a
//! reader never observes a half-written session.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

use hotel_voice_core::Session;

use crate::{CallGuard, CallLocks, SessionStore, StoreError};

pub struct FileSessionStore {
    dir: PathBuf,
    locks: CallLocks,
}

impl FileSessionStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "Opened file session store");
        Ok(Self {
            dir,
            locks: CallLocks::new(),
        })
    }

    /// Location of a call's record
    pub fn path_for(&self, call_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(call_id)))
    }
}

/// Escape a call id into a safe, collision-free file stem
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes
/// `%XX`.
fn file_stem(call_id: &str) -> String {
    let mut stem = String::with_capacity(call_id.len());
    for byte in call_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

fn write_atomic(dir: &Path, target: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, call_id: &str) -> Result<Option<Session>, StoreError> {
        let path = self.path_for(call_id);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session = Session::from_json(&contents).map_err(|e| StoreError::Corrupt {
            call_id: call_id.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(session))
    }

    async fn put(&self, session: &Session) -> Result<(), StoreError> {
        let json = session.to_json()?;
        let dir = self.dir.clone();
        let target = self.path_for(&session.call_id);

        tokio::task::spawn_blocking(move || write_atomic(&dir, &target, json.as_bytes()))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;
        Ok(())
    }

    async fn delete(&self, call_id: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(call_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn lock(&self, call_id: &str) -> CallGuard {
        self.locks.acquire(call_id).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_escapes_unsafe_bytes() {
        assert_eq!(file_stem("CA0123abc"), "CA0123abc");
        assert_eq!(file_stem("../etc/passwd"), "%2E%2E%2Fetc%2Fpasswd");
        assert_ne!(file_stem("a/b"), file_stem("a_b"));
        assert_ne!(file_stem("a%2Fb"), file_stem("a/b"));
    }

    #[tokio::test]
    async fn test_path_stays_inside_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path()).unwrap();
        let path = store.path_for("../../escape");
        assert_eq!(path.parent(), Some(dir.path()));
    }
}
