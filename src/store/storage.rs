use std::{
    cell::RefCell,
    collections::HashMap,
    fs::File,
    io::{ErrorKind, Read, Seek, Write},
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use fs4::fs_std::FileExt;
use tracing::{debug, trace};

/// Interface for abstracting the local key-value storage. Every value is an opaque text blob,
/// usually serialized json. Implementations are synchronous: there is nothing to await for a
/// local read or write.
pub trait KeyValueStorage {
    /// Returns the stored blob or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the blob stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: Deref> KeyValueStorage for T
where
    T::Target: KeyValueStorage,
{
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.deref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.deref().set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.deref().remove(key)
    }
}

/// The main realization of [KeyValueStorage]. Each key lives in its own `<key>.json` file inside
/// a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(anyhow!("Illegal storage key {key:?}"));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn read_locked(path: &Path) -> std::result::Result<String, std::io::Error> {
        let mut file = File::open(path)?;
        FileExt::lock_shared(&file)?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content);
        FileExt::unlock(&file)?;
        result.map(|_| content)
    }

    fn write_locked(path: &Path, value: &str) -> std::result::Result<(), std::io::Error> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        // Truncation happens only after the lock is held, otherwise a reader could observe an
        // empty blob.
        FileExt::lock_exclusive(&file)?;
        let result = (|| {
            file.set_len(0)?;
            file.rewind()?;
            file.write_all(value.as_bytes())?;
            file.flush()
        })();
        FileExt::unlock(&file)?;
        result
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        trace!("Reading {path:?}");
        match Self::read_locked(&path) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        debug!("Writing {} bytes into {path:?}", value.len());
        Self::write_locked(&path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Storage that lives only as long as the value. Used in tests and for dry runs.
#[derive(Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
