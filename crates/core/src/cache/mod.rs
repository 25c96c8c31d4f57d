//! Content-addressed result cache with TTL expiration.
//!
//! Keys are a short digest of the lowercased, trimmed input text, so lookups
//! are case- and surrounding-whitespace-insensitive but otherwise
//! exact-text-sensitive. The whole store is written to a JSON file on every
//! mutation; a single in-process lock serializes access. Not multi-process
//! safe.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::ensemble::Prediction;

/// Hex characters of the digest kept as the key. Collisions are acceptable
/// at single-process session scale.
const DIGEST_LEN: usize = 12;

/// Characters of the original text stored alongside an entry.
const PREVIEW_LEN: usize = 100;

/// One stored verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub text_preview: String,
    pub result: Prediction,
}

/// Cache statistics for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_hours: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

pub struct CacheManager {
    path: PathBuf,
    ttl: Duration,
    ttl_hours: u64,
    inner: Mutex<CacheInner>,
}

impl CacheManager {
    /// Open (or create) the cache at `path`. A corrupt or unreadable file
    /// degrades to an empty cache; expired entries are dropped up front.
    pub fn new(path: impl Into<PathBuf>, ttl_hours: u64) -> Self {
        let path = path.into();
        let entries = Self::load_entries(&path);

        let cache = Self {
            path,
            ttl: Duration::hours(ttl_hours as i64),
            ttl_hours,
            inner: Mutex::new(CacheInner {
                entries,
                hits: 0,
                misses: 0,
            }),
        };
        cache.cleanup_expired();

        info!(
            entries = cache.inner.lock().unwrap().entries.len(),
            ttl_hours, "cache initialized"
        );
        cache
    }

    fn load_entries(path: &Path) -> HashMap<String, CacheEntry> {
        if !path.exists() {
            return HashMap::new();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to parse cache file, starting empty");
                    HashMap::new()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read cache file, starting empty");
                HashMap::new()
            }
        }
    }

    /// Persist the whole store. IO failures are logged, never propagated.
    fn save(&self, inner: &CacheInner) {
        match serde_json::to_string_pretty(&inner.entries) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&self.path, json) {
                    error!(path = %self.path.display(), error = %err, "failed to save cache file");
                }
            }
            Err(err) => error!(error = %err, "failed to serialize cache"),
        }
    }

    /// Digest of the normalized text: lowercased and trimmed, so lookups
    /// ignore case and surrounding whitespace.
    fn digest(text: &str) -> String {
        let normalized = text.trim().to_lowercase();
        let hash = format!("{:x}", md5::compute(normalized.as_bytes()));
        hash[..DIGEST_LEN].to_string()
    }

    /// Deterministic ~1% sample of keys that trigger a full sweep on `get`.
    fn should_sweep(key: &str) -> bool {
        u64::from_str_radix(&key[..8], 16)
            .map(|n| n % 100 == 0)
            .unwrap_or(false)
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now > entry.timestamp + self.ttl
    }

    /// Drop every expired entry and persist if anything was removed.
    fn cleanup_expired(&self) {
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| now <= entry.timestamp + self.ttl);
        let removed = before - inner.entries.len();
        if removed > 0 {
            info!(removed, "cleaned up expired cache entries");
            self.save(&inner);
        }
    }

    /// Look up a prior verdict. Stale entries are treated as misses and
    /// evicted in place; hits are returned with the cached flag set.
    pub fn get(&self, text: &str) -> Option<Prediction> {
        let key = Self::digest(text);

        if Self::should_sweep(&key) {
            self.cleanup_expired();
        }

        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap();

        let expired = match inner.entries.get(&key) {
            None => {
                inner.misses += 1;
                return None;
            }
            Some(entry) => self.is_expired(entry, now),
        };

        if expired {
            inner.misses += 1;
            inner.entries.remove(&key);
            self.save(&inner);
            return None;
        }

        inner.hits += 1;
        let mut result = inner.entries[&key].result.clone();
        result.cached = true;
        debug!(%key, "cache hit");
        Some(result)
    }

    /// Store a verdict, overwriting any previous entry for the same digest.
    pub fn set(&self, text: &str, result: &Prediction) {
        let key = Self::digest(text);
        let preview: String = text.chars().take(PREVIEW_LEN).collect();

        let mut inner = self.inner.lock().unwrap();
        inner.entries.insert(
            key.clone(),
            CacheEntry {
                timestamp: Utc::now(),
                text_preview: preview,
                result: result.clone(),
            },
        );
        self.save(&inner);
        debug!(%key, "cached result");
    }

    /// Drop all entries and reset the hit/miss counters.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
        self.save(&inner);
        info!("cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        let total = inner.hits + inner.misses;
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            hit_rate: if total > 0 {
                (inner.hits as f64 / total as f64 * 10_000.0).round() / 10_000.0
            } else {
                0.0
            },
            ttl_hours: self.ttl_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::Verdict;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn prediction(verdict: Verdict, prob: f64) -> Prediction {
        Prediction {
            prediction: verdict,
            fake_probability: prob,
            confidence: 0.8,
            models_used: vec!["heuristic".to_string()],
            model_scores: vec![],
            indicators: BTreeMap::new(),
            indicator_details: vec![],
            explanation: String::new(),
            processing_time: 0.01,
            timestamp: Utc::now(),
            cached: false,
        }
    }

    fn temp_cache(ttl_hours: u64) -> (CacheManager, TempDir) {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().join("cache.json"), ttl_hours);
        (cache, dir)
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let (cache, _dir) = temp_cache(24);
        let text = "Sample news article for testing";
        cache.set(text, &prediction(Verdict::Real, 0.2));

        let hit = cache.get(text).unwrap();
        assert_eq!(hit.prediction, Verdict::Real);
        assert_eq!(hit.fake_probability, 0.2);
        assert!(hit.cached);
    }

    #[test]
    fn test_get_nonexistent_is_miss() {
        let (cache, _dir) = temp_cache(24);
        assert!(cache.get("this text was never cached").is_none());

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_lookup_ignores_case_and_surrounding_whitespace() {
        let (cache, _dir) = temp_cache(24);
        cache.set("Breaking News About Storms", &prediction(Verdict::Fake, 0.9));

        assert!(cache.get("breaking news about storms").is_some());
        assert!(cache.get("  BREAKING NEWS ABOUT STORMS  ").is_some());
        assert!(cache.get("breaking news about storm").is_none());
    }

    #[test]
    fn test_expired_entry_is_miss_and_removed() {
        let (cache, _dir) = temp_cache(0);
        let text = "Entry that expires immediately";
        cache.set(text, &prediction(Verdict::Fake, 0.8));

        // TTL of zero hours: anything older than "now" is stale.
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(cache.get(text).is_none());
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_set_overwrites_existing_entry() {
        let (cache, _dir) = temp_cache(24);
        let text = "Same text cached twice";
        cache.set(text, &prediction(Verdict::Real, 0.1));
        cache.set(text, &prediction(Verdict::Fake, 0.9));

        let hit = cache.get(text).unwrap();
        assert_eq!(hit.prediction, Verdict::Fake);
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let text = "Persisted across restarts";

        {
            let cache = CacheManager::new(&path, 24);
            cache.set(text, &prediction(Verdict::Real, 0.15));
        }

        let reopened = CacheManager::new(&path, 24);
        let hit = reopened.get(text).unwrap();
        assert_eq!(hit.fake_probability, 0.15);
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{not valid json").unwrap();

        let cache = CacheManager::new(&path, 24);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_clear_resets_entries_and_counters() {
        let (cache, _dir) = temp_cache(24);
        cache.set("one", &prediction(Verdict::Real, 0.2));
        cache.get("one");
        cache.get("two");

        cache.clear();
        let stats = cache.stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_hit_rate() {
        let (cache, _dir) = temp_cache(24);
        cache.set("text", &prediction(Verdict::Real, 0.2));
        cache.get("text");
        cache.get("text");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.6667).abs() < 1e-4);
    }

    #[test]
    fn test_digest_is_stable_and_short() {
        let a = CacheManager::digest("Some Text");
        let b = CacheManager::digest("  some text ");
        assert_eq!(a, b);
        assert_eq!(a.len(), DIGEST_LEN);
    }

    #[test]
    fn test_stored_result_keeps_cached_flag_unset() {
        // The flag is set on the returned copy, not the stored value.
        let (cache, _dir) = temp_cache(24);
        cache.set("text", &prediction(Verdict::Real, 0.2));

        assert!(cache.get("text").unwrap().cached);
        // Second read still hits: eviction did not occur
        assert!(cache.get("text").unwrap().cached);
    }
}
