use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

/// How many pages are kept at most, unless told otherwise.
pub const DEFAULT_MAX_ENTRIES: usize = 300;

/// Whole rendered pages, kept for a fixed amount of time.
///
/// Nothing is invalidated when the underlying data changes: an entry lives
/// until it expires, is culled to make room, or the cache is cleared.
pub struct PageCache {
    ttl: Duration,
    max_entries: usize,
    pages: Mutex<HashMap<String, (Instant, Vec<u8>)>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        PageCache::with_max_entries(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(ttl: Duration, max_entries: usize) -> Self {
        PageCache {
            ttl,
            max_entries: max_entries.max(1),
            pages: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (Instant, Vec<u8>)>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut pages = self.lock();
        match pages.get(key) {
            Some((stored, page)) if stored.elapsed() < self.ttl => Some(page.clone()),
            Some(_) => {
                pages.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a page, after dropping expired ones. When still full, the
    /// oldest pages go first.
    pub fn insert(&self, key: String, page: Vec<u8>) {
        let ttl = self.ttl;
        let mut pages = self.lock();
        pages.retain(|_, (stored, _)| stored.elapsed() < ttl);
        if !pages.contains_key(&key) && pages.len() >= self.max_entries {
            let mut by_age = pages
                .iter()
                .map(|(k, (stored, _))| (*stored, k.clone()))
                .collect::<Vec<_>>();
            by_age.sort();
            let excess = pages.len() + 1 - self.max_entries;
            for (_, old) in by_age.into_iter().take(excess) {
                pages.remove(&old);
            }
        }
        pages.insert(key, (Instant::now(), page));
    }

    /// Returns the cached page for `key`, rendering and storing it when
    /// missing or expired. Failed renders are not cached.
    pub fn get_or_render<E, F>(&self, key: &str, render: F) -> Result<Vec<u8>, E>
    where
        F: FnOnce() -> Result<Vec<u8>, E>,
    {
        if let Some(page) = self.get(key) {
            return Ok(page);
        }
        let page = render()?;
        self.insert(key.to_owned(), page.clone());
        Ok(page)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }
}
