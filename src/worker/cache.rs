use std::{collections::BTreeMap, fs, io::ErrorKind, path::Path};

use parking_lot::Mutex;

use crate::{
    net::Response,
    storage::{write_atomically, StorageError},
};

type Generation = BTreeMap<String, Response>;

/// Named cache generations, each mapping a URL to a stored response, kept in
/// the order they were created. Concurrent writers to the same key: last
/// write wins.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: Mutex<Vec<(String, Generation)>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a snapshot written by [`CacheStorage::save`]. A missing file
    /// yields an empty store.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let caches = match fs::read(path) {
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            caches: Mutex::new(caches),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let payload = serde_json::to_vec(&*self.caches.lock())?;
        write_atomically(path, &payload)
    }

    /// Creates the named generation if it does not exist yet.
    pub fn open(&self, name: &str) {
        generation_mut(&mut self.caches.lock(), name);
    }

    pub fn put(&self, name: &str, key: &str, response: Response) {
        generation_mut(&mut self.caches.lock(), name).insert(key.to_string(), response);
    }

    /// Inserts a batch under a single lock.
    pub fn put_all(&self, name: &str, entries: Vec<(String, Response)>) {
        generation_mut(&mut self.caches.lock(), name).extend(entries);
    }

    /// Looks `key` up across all generations, earliest created first.
    pub fn match_key(&self, key: &str) -> Option<Response> {
        self.caches
            .lock()
            .iter()
            .find_map(|(_, generation)| generation.get(key).cloned())
    }

    /// Generation names in creation order.
    pub fn keys(&self) -> Vec<String> {
        self.caches.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn delete(&self, name: &str) -> bool {
        let mut caches = self.caches.lock();
        let before = caches.len();
        caches.retain(|(existing, _)| existing != name);
        caches.len() != before
    }

    #[cfg(test)]
    pub fn len(&self, name: &str) -> usize {
        self.caches
            .lock()
            .iter()
            .find(|(existing, _)| existing == name)
            .map_or(0, |(_, generation)| generation.len())
    }
}

fn generation_mut<'a>(caches: &'a mut Vec<(String, Generation)>, name: &str) -> &'a mut Generation {
    let index = match caches.iter().position(|(existing, _)| existing == name) {
        Some(index) => index,
        None => {
            caches.push((name.to_string(), Generation::new()));
            caches.len() - 1
        }
    };
    &mut caches[index].1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{testing::plain, ResponseKind};

    #[test]
    fn match_searches_every_generation() {
        let storage = CacheStorage::new();
        storage.put("old", "http://app.test/a", plain(200, ResponseKind::Basic, b"a"));
        storage.open("new");
        assert!(storage.match_key("http://app.test/a").is_some());
        assert!(storage.match_key("http://app.test/b").is_none());
        assert_eq!(storage.keys(), vec!["old".to_string(), "new".to_string()]);
    }

    #[test]
    fn match_prefers_the_earliest_created_generation() {
        let storage = CacheStorage::new();
        storage.put("autou-v9.0.0", "k", plain(200, ResponseKind::Basic, b"nine"));
        storage.put("autou-v10.0.0", "k", plain(200, ResponseKind::Basic, b"ten"));

        assert_eq!(storage.match_key("k").map(|r| r.body), Some(b"nine".to_vec()));
        assert!(storage.delete("autou-v9.0.0"));
        assert!(!storage.delete("autou-v9.0.0"));
        assert_eq!(storage.match_key("k").map(|r| r.body), Some(b"ten".to_vec()));
    }

    #[test]
    fn later_put_replaces_earlier() {
        let storage = CacheStorage::new();
        storage.put("v1", "k", plain(200, ResponseKind::Basic, b"first"));
        storage.put("v1", "k", plain(200, ResponseKind::Basic, b"second"));
        assert_eq!(storage.match_key("k").map(|r| r.body), Some(b"second".to_vec()));
        assert_eq!(storage.len("v1"), 1);
    }

    #[test]
    fn snapshot_survives_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        let storage = CacheStorage::new();
        storage.put("autou-v1.0.0", "k", plain(200, ResponseKind::Basic, b"body"));
        storage.save(&path).expect("save");

        let restored = CacheStorage::load(&path).expect("load");
        assert_eq!(restored.keys(), vec!["autou-v1.0.0".to_string()]);
        assert_eq!(restored.match_key("k").map(|r| r.body), Some(b"body".to_vec()));
    }
}
