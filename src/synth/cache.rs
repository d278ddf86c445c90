//! TTL cache for generated commit messages.
//!
//! Keys hash the category id together with a diff prefix, so near-identical
//! re-runs (same change, same classification) reuse the previous message
//! instead of spending another backend call.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{Duration, Instant};

use crate::analysis::Category;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// How much of the diff participates in the cache key. Enough to
/// distinguish real changes, short enough to keep hashing cheap.
const KEY_DIFF_PREFIX_CHARS: usize = 500;

struct CacheEntry {
    message: String,
    created_at: Instant,
}

/// Counts reported by [`ResponseCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

/// In-memory response cache with lazy expiry.
///
/// Expired entries are dropped when read, not on a timer; an entry that is
/// never read again simply lingers until `clear` or process exit.
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<u64, CacheEntry>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        ResponseCache::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        ResponseCache { ttl, entries: HashMap::new() }
    }

    /// Cache key for a (category, diff) pair.
    pub fn key(category: Category, diff_text: &str) -> u64 {
        let prefix: String = diff_text.chars().take(KEY_DIFF_PREFIX_CHARS).collect();
        let mut hasher = DefaultHasher::new();
        category.id().hash(&mut hasher);
        prefix.hash(&mut hasher);
        hasher.finish()
    }

    /// Fetch a live entry. An expired entry is removed and reported as a
    /// miss.
    pub fn get(&mut self, key: u64) -> Option<String> {
        match self.entries.get(&key) {
            Some(entry) if entry.created_at.elapsed() < self.ttl => {
                Some(entry.message.clone())
            }
            Some(_) => {
                self.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put(&mut self, key: u64, message: String) {
        self.entries.insert(key, CacheEntry { message, created_at: Instant::now() });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let total = self.entries.len();
        let active = self
            .entries
            .values()
            .filter(|e| e.created_at.elapsed() < self.ttl)
            .count();
        CacheStats { total, active, expired: total - active }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get_within_ttl() {
        let mut cache = ResponseCache::default();
        let key = ResponseCache::key(Category::Feat, "+new endpoint\n");
        cache.put(key, "✨ feat: add endpoint".to_string());
        assert_eq!(cache.get(key), Some("✨ feat: add endpoint".to_string()));
    }

    #[test]
    fn test_expired_entry_is_removed_on_read() {
        let mut cache = ResponseCache::new(Duration::from_millis(0));
        let key = ResponseCache::key(Category::Fix, "-bug\n");
        cache.put(key, "🐛 fix: squash".to_string());
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(key), None);
        assert_eq!(cache.stats().total, 0);
    }

    #[test]
    fn test_key_depends_on_category() {
        let diff = "+same diff\n";
        assert_ne!(
            ResponseCache::key(Category::Feat, diff),
            ResponseCache::key(Category::Fix, diff)
        );
    }

    #[test]
    fn test_key_ignores_diff_beyond_prefix() {
        let base = "x".repeat(KEY_DIFF_PREFIX_CHARS);
        let a = format!("{base}AAAA");
        let b = format!("{base}BBBB");
        assert_eq!(
            ResponseCache::key(Category::Chore, &a),
            ResponseCache::key(Category::Chore, &b)
        );
    }

    #[test]
    fn test_key_is_char_based_not_byte_based() {
        // Multi-byte chars near the boundary must not split.
        let diff = "é".repeat(KEY_DIFF_PREFIX_CHARS + 10);
        let _ = ResponseCache::key(Category::Docs, &diff);
    }

    #[test]
    fn test_stats_counts_active_and_expired() {
        let mut cache = ResponseCache::new(Duration::from_secs(60));
        cache.put(1, "a".to_string());
        cache.put(2, "b".to_string());
        let stats = cache.stats();
        assert_eq!(stats, CacheStats { total: 2, active: 2, expired: 0 });
    }

    #[test]
    fn test_clear_empties_the_cache() {
        let mut cache = ResponseCache::default();
        cache.put(7, "m".to_string());
        cache.clear();
        assert_eq!(cache.get(7), None);
        assert_eq!(cache.stats().total, 0);
    }
}
