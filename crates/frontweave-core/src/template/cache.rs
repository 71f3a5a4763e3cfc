//! Read-through template cache
//!
//! Keyed by lexically normalized path. Entries live until the caller evicts them;
//! there is no time-based expiry. Concurrent loads of the same path converge on
//! whichever entry is inserted first.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

use super::{TemplateDefinition, TemplateError, TemplateSource};

#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: RwLock<HashMap<PathBuf, Arc<TemplateDefinition>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached template for `path`, loading it through `source` on a miss
    ///
    /// Failed loads are not cached.
    pub fn get_or_load<S>(&self, path: &Path, source: &S) -> Result<Arc<TemplateDefinition>, TemplateError>
    where
        S: TemplateSource + ?Sized,
    {
        let key = normalize(path);

        if let Some(hit) = self.read().get(&key) {
            trace!(path = %key.display(), "template cache hit");
            return Ok(Arc::clone(hit));
        }

        trace!(path = %key.display(), "template cache miss");
        let loaded = Arc::new(source.load(path)?);
        let mut entries = self.write();
        Ok(Arc::clone(entries.entry(key).or_insert(loaded)))
    }

    /// Cached template for `path`, without loading
    pub fn get(&self, path: &Path) -> Option<Arc<TemplateDefinition>> {
        self.read().get(&normalize(path)).cloned()
    }

    /// Evict one entry; returns whether it was present
    pub fn invalidate(&self, path: &Path) -> bool {
        self.write().remove(&normalize(path)).is_some()
    }

    /// Evict every entry
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, Arc<TemplateDefinition>>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, Arc<TemplateDefinition>>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Drop `.` components and fold `..` where a normal component precedes it
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let folded = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if folded {
                    normalized.pop();
                } else {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryFs;
    use crate::template::TemplateLoader;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that counts how often it is asked to load
    struct CountingSource {
        inner: TemplateLoader<MemoryFs>,
        loads: AtomicUsize,
    }

    impl TemplateSource for CountingSource {
        fn load(&self, path: &Path) -> Result<TemplateDefinition, TemplateError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(path)
        }
    }

    fn source() -> CountingSource {
        let fs = MemoryFs::new();
        fs.insert("templates/main.json", r#"{"title": "{title}"}"#);
        CountingSource {
            inner: TemplateLoader::new(fs),
            loads: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_read_through_loads_once() {
        let cache = TemplateCache::new();
        let source = source();

        let first = cache.get_or_load(Path::new("templates/main.json"), &source).unwrap();
        let second = cache
            .get_or_load(Path::new("./templates/main.json"), &source)
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
        assert_eq!(first.content(), &json!({"title": "{title}"}));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = TemplateCache::new();
        let source = source();
        let path = Path::new("templates/main.json");

        cache.get_or_load(path, &source).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.invalidate(path));
        assert!(!cache.invalidate(path));
        assert!(cache.is_empty());

        cache.get_or_load(path, &source).unwrap();
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
        cache.clear();
        assert!(cache.get(path).is_none());
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = TemplateCache::new();
        let err = cache
            .get_or_load(Path::new("missing.json"), &source())
            .unwrap_err();
        assert_eq!(err.code(), "TEMPLATE_NOT_FOUND");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_loads_converge_on_one_entry() {
        let cache = Arc::new(TemplateCache::new());
        let source = Arc::new(source());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let source = Arc::clone(&source);
                std::thread::spawn(move || {
                    cache
                        .get_or_load(Path::new("templates/main.json"), source.as_ref())
                        .unwrap()
                })
            })
            .collect();

        let loaded: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = cache.get(Path::new("templates/main.json")).unwrap();

        assert_eq!(cache.len(), 1);
        assert!(loaded.iter().all(|t| Arc::ptr_eq(t, &cached)));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("./a/./b.json")), PathBuf::from("a/b.json"));
        assert_eq!(normalize(Path::new("a/c/../b.json")), PathBuf::from("a/b.json"));
        assert_eq!(normalize(Path::new("../b.json")), PathBuf::from("../b.json"));
    }
}
