use crate::models::listing::PackageListingDetail;
use log::debug;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache key for the package-detail lookup path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingCacheKey {
    pub namespace: String,
    pub name: String,
    pub community: String,
}

impl ListingCacheKey {
    pub fn new(namespace: &str, name: &str, community: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            community: community.to_string(),
        }
    }
}

/// Cached lookup result. Misses are cached too so repeated lookups of
/// unknown packages skip the database as well.
#[derive(Debug, Clone)]
pub enum CachedListing {
    Found(PackageListingDetail),
    NotFound,
}

/// Process-wide cache for listing lookups keyed by
/// (namespace, package name, community). Mutations to a listing must
/// invalidate the exact key before the response is returned; there is no
/// time-based expiry.
#[derive(Debug, Default)]
pub struct ListingCacheService {
    entries: RwLock<HashMap<ListingCacheKey, CachedListing>>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl ListingCacheService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ListingCacheKey) -> Option<CachedListing> {
        let entries = match self.entries.read() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        match entries.get(key) {
            Some(entry) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Some(entry.clone())
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: ListingCacheKey, value: CachedListing) {
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(key, value);
    }

    /// Evicts the entry for the exact key. Called synchronously in the same
    /// request that mutates the underlying listing.
    pub fn invalidate(&self, key: &ListingCacheKey) {
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        if entries.remove(key).is_some() {
            debug!(
                "Invalidated listing cache entry for {}/{} in {}",
                key.namespace, key.name, key.community
            );
        }
    }

    pub fn clear(&self) {
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.clear();
    }

    pub fn stats(&self) -> (u64, u64, usize) {
        let len = match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        };
        (
            self.hit_count.load(Ordering::Relaxed),
            self.miss_count.load(Ordering::Relaxed),
            len,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(name: &str) -> PackageListingDetail {
        PackageListingDetail {
            namespace: "TestTeam".to_string(),
            name: name.to_string(),
            community: "test".to_string(),
            description: String::new(),
            latest_version_number: None,
            download_count: 0,
            is_deprecated: false,
            has_nsfw_content: false,
            categories: Vec::new(),
            datetime_updated: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_get_counts_hits_and_misses() {
        let cache = ListingCacheService::new();
        let key = ListingCacheKey::new("TestTeam", "Mod", "test");

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), CachedListing::Found(detail("Mod")));
        assert!(matches!(cache.get(&key), Some(CachedListing::Found(_))));

        let (hits, misses, len) = cache.stats();
        assert_eq!(hits, 1);
        assert_eq!(misses, 1);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_invalidate_removes_only_exact_key() {
        let cache = ListingCacheService::new();
        let key_a = ListingCacheKey::new("TestTeam", "ModA", "test");
        let key_b = ListingCacheKey::new("TestTeam", "ModB", "test");

        cache.insert(key_a.clone(), CachedListing::Found(detail("ModA")));
        cache.insert(key_b.clone(), CachedListing::NotFound);

        cache.invalidate(&key_a);

        assert!(cache.get(&key_a).is_none());
        assert!(matches!(cache.get(&key_b), Some(CachedListing::NotFound)));
    }

    #[test]
    fn test_not_found_is_cached() {
        let cache = ListingCacheService::new();
        let key = ListingCacheKey::new("TestTeam", "Missing", "test");

        cache.insert(key.clone(), CachedListing::NotFound);
        assert!(matches!(cache.get(&key), Some(CachedListing::NotFound)));
    }
}
