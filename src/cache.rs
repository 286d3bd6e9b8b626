//! Memoized rendering keyed by song settings.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::config::SongConfig;
use crate::error::Result;
use crate::song::Song;

/// BLAKE3 hash of the canonical JSON form of `config`.
///
/// `serde_json::Value` keeps object keys sorted, so two configs that compare
/// equal always hash the same.
pub fn cache_key(config: &SongConfig) -> Result<String> {
    let canonical = serde_json::to_value(config)?.to_string();
    Ok(blake3::hash(canonical.as_bytes()).to_hex().to_string())
}

/// Rendered wav images by [`cache_key`].
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<String, Vec<u8>>,
    hits: usize,
    misses: usize,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered bytes for `config`, rendering only on the first request.
    pub fn render(&mut self, config: &SongConfig) -> Result<&[u8]> {
        let key = cache_key(config)?;
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                debug!(key = %entry.key(), "render cache hit");
                Ok(entry.into_mut().as_slice())
            }
            Entry::Vacant(entry) => {
                let bytes = Song::from_config(config)?.render();
                self.misses += 1;
                debug!(key = %entry.key(), bytes = bytes.len(), "render cache miss");
                Ok(entry.insert(bytes).as_slice())
            }
        }
    }

    pub fn contains(&self, config: &SongConfig) -> Result<bool> {
        Ok(self.entries.contains_key(&cache_key(config)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_song() -> SongConfig {
        SongConfig {
            sample_rate: 1000,
            block_size: 50,
            duration: Some(0.2),
            ..SongConfig::default()
        }
    }

    #[test]
    fn test_cache_key_is_stable() {
        let key = cache_key(&short_song()).unwrap();
        assert_eq!(key.len(), 64);
        assert_eq!(key, cache_key(&short_song()).unwrap());
    }

    #[test]
    fn test_cache_key_changes_with_settings() {
        let mut other = short_song();
        other.instrument.envelope.release = 0.3;
        assert_ne!(
            cache_key(&short_song()).unwrap(),
            cache_key(&other).unwrap()
        );
    }

    #[test]
    fn test_render_once_per_key() {
        let mut cache = RenderCache::new();
        let first = cache.render(&short_song()).unwrap().to_vec();
        let second = cache.render(&short_song()).unwrap().to_vec();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert!(cache.contains(&short_song()).unwrap());
    }

    #[test]
    fn test_invalid_song_is_not_cached() {
        let mut cache = RenderCache::new();
        let config = SongConfig {
            sample_rate: 0,
            ..short_song()
        };
        assert!(cache.render(&config).is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 0);
    }
}
