// GPU Texture cache with LRU eviction
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use lru::LruCache;
use egui::{ColorImage, Context, TextureHandle};

use crate::media::DecodedImage;

/// What the cache knows about a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureStatus {
    /// Never requested, or evicted
    Missing,
    Pending,
    Ready,
    Failed,
}

/// Texture cache for tile and modal stills.
/// Uses LRU eviction to manage memory and remembers failures so a broken
/// file is shown as a placeholder instead of being retried every frame.
pub struct TextureCache {
    cache: LruCache<String, TextureHandle>,
    pending: HashSet<String>,
    failed: HashMap<String, String>,
}

impl TextureCache {
    /// Create a new texture cache with the given maximum size
    pub fn new(max_size: usize) -> Self {
        let capacity = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            pending: HashSet::new(),
            failed: HashMap::new(),
        }
    }

    pub fn status(&self, key: &str) -> TextureStatus {
        if self.failed.contains_key(key) {
            TextureStatus::Failed
        } else if self.cache.contains(key) {
            TextureStatus::Ready
        } else if self.pending.contains(key) {
            TextureStatus::Pending
        } else {
            TextureStatus::Missing
        }
    }

    /// Get a texture from the cache
    pub fn get(&mut self, key: &str) -> Option<&TextureHandle> {
        self.cache.get(key)
    }

    /// Remember that a load for `key` is in flight
    pub fn mark_pending(&mut self, key: &str) {
        self.pending.insert(key.to_string());
    }

    /// Upload decoded pixels
    pub fn insert_decoded(&mut self, ctx: &Context, key: &str, image: &DecodedImage) {
        self.insert_rgba(ctx, key, &image.rgba, image.width, image.height);
    }

    /// Load a texture from raw RGBA data, replacing any previous one
    pub fn insert_rgba(&mut self, ctx: &Context, key: &str, data: &[u8], width: u32, height: u32) {
        let color_image = ColorImage::from_rgba_unmultiplied([width as usize, height as usize], data);
        let handle = ctx.load_texture(key, color_image, egui::TextureOptions::LINEAR);
        self.pending.remove(key);
        self.failed.remove(key);
        self.cache.put(key.to_string(), handle);
    }

    pub fn mark_failed(&mut self, key: &str, reason: impl Into<String>) {
        self.pending.remove(key);
        self.failed.insert(key.to_string(), reason.into());
    }

    pub fn failure(&self, key: &str) -> Option<&str> {
        self.failed.get(key).map(String::as_str)
    }

    /// Get the number of cached textures
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.cache.clear();
        self.pending.clear();
        self.failed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tracks_pending_ready_and_failed() {
        let ctx = Context::default();
        let mut cache = TextureCache::new(2);
        assert_eq!(cache.status("tile:0"), TextureStatus::Missing);

        cache.mark_pending("tile:0");
        assert_eq!(cache.status("tile:0"), TextureStatus::Pending);

        cache.insert_rgba(&ctx, "tile:0", &[0; 16], 2, 2);
        assert_eq!(cache.status("tile:0"), TextureStatus::Ready);
        assert!(cache.get("tile:0").is_some());

        cache.mark_pending("tile:1");
        cache.mark_failed("tile:1", "Imagen no disponible");
        assert_eq!(cache.status("tile:1"), TextureStatus::Failed);
        assert_eq!(cache.failure("tile:1"), Some("Imagen no disponible"));
    }

    #[test]
    fn least_recently_used_texture_is_evicted() {
        let ctx = Context::default();
        let mut cache = TextureCache::new(2);
        cache.insert_rgba(&ctx, "a", &[0; 4], 1, 1);
        cache.insert_rgba(&ctx, "b", &[0; 4], 1, 1);
        cache.get("a");
        cache.insert_rgba(&ctx, "c", &[0; 4], 1, 1);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.status("b"), TextureStatus::Missing);
        assert_eq!(cache.status("a"), TextureStatus::Ready);
    }

    #[test]
    fn clear_forgets_everything() {
        let ctx = Context::default();
        let mut cache = TextureCache::new(4);
        cache.insert_rgba(&ctx, "a", &[0; 4], 1, 1);
        cache.mark_failed("b", "broken");
        cache.mark_pending("c");

        cache.clear();
        assert_eq!(cache.status("b"), TextureStatus::Missing);
        assert_eq!(cache.status("c"), TextureStatus::Missing);
        assert!(cache.is_empty());
    }
}
