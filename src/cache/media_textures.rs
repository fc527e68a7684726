// Texture bookkeeping for tiles and the modal: stills from the loader,
// live frames from whichever surface is playing
use std::collections::HashMap;
use std::path::PathBuf;

use egui::load::SizedTexture;
use egui::{ColorImage, Context, TextureHandle};

use super::texture_cache::{TextureCache, TextureStatus};
use crate::catalog::{ItemId, MediaItem};
use crate::media::{LoadRequest, MediaLoader, VideoFrame, VideoSurface};
use crate::playback::{PlaybackCoordinator, PlaybackState, SurfaceId};

/// Max stills kept on the GPU
const MAX_STILLS: usize = 200;

/// A still finished loading (or failed) for an item
#[derive(Debug, Clone, PartialEq)]
pub struct StillOutcome {
    pub id: ItemId,
    pub result: Result<(), String>,
}

pub struct MediaTextures {
    stills: TextureCache,
    frames: HashMap<SurfaceId, TextureHandle>,
    loader: MediaLoader,
}

impl MediaTextures {
    pub fn new() -> Self {
        Self {
            stills: TextureCache::new(MAX_STILLS),
            frames: HashMap::new(),
            loader: MediaLoader::new(),
        }
    }

    pub fn still_key(id: ItemId) -> String {
        format!("still:{}", id)
    }

    pub fn status(&self, id: ItemId) -> TextureStatus {
        self.stills.status(&Self::still_key(id))
    }

    /// Queue the item's still unless it is loaded, loading or known broken
    pub fn ensure_still(&mut self, item: &MediaItem, path: PathBuf) {
        let key = Self::still_key(item.id);
        if self.stills.status(&key) != TextureStatus::Missing {
            return;
        }
        self.stills.mark_pending(&key);
        self.loader.request(LoadRequest {
            key,
            path,
            kind: item.kind,
        });
    }

    pub fn still(&mut self, id: ItemId) -> Option<SizedTexture> {
        self.stills.get(&Self::still_key(id)).map(SizedTexture::from_handle)
    }

    pub fn failure(&self, id: ItemId) -> Option<&str> {
        self.stills.failure(&Self::still_key(id))
    }

    /// Last frame shown by a surface, kept while it is paused
    pub fn frame(&self, surface: SurfaceId) -> Option<SizedTexture> {
        self.frames.get(&surface).map(SizedTexture::from_handle)
    }

    /// Drop the last frame of a surface whose element was released or replaced
    pub fn forget_frame(&mut self, surface: SurfaceId) {
        self.frames.remove(&surface);
    }

    /// Upload finished stills; returns what completed this frame
    pub fn poll(&mut self, ctx: &Context) -> Vec<StillOutcome> {
        let mut outcomes = Vec::new();
        while let Some(loaded) = self.loader.poll() {
            let Some(id) = parse_still_key(&loaded.key) else {
                continue;
            };
            let result = match loaded.result {
                Ok(image) => {
                    self.stills.insert_decoded(ctx, &loaded.key, &image);
                    Ok(())
                }
                Err(e) => {
                    let reason = e.to_string();
                    self.stills.mark_failed(&loaded.key, reason.clone());
                    Err(reason)
                }
            };
            outcomes.push(StillOutcome { id, result });
        }
        outcomes
    }

    /// Pull the newest frame of the active surface and forget frames of
    /// surfaces that are gone. True while something is playing.
    pub fn update_frames(&mut self, ctx: &Context, playback: &mut PlaybackCoordinator<VideoSurface>) -> bool {
        self.frames.retain(|id, _| playback.contains(*id));

        let PlaybackState::Playing(active) = playback.state() else {
            return false;
        };

        if let Some(frame) = playback.surface_mut(active).and_then(VideoSurface::latest_frame) {
            self.show_frame(ctx, active, &frame);
        }
        true
    }

    /// Upload `frame` as the picture of `surface`
    pub(crate) fn show_frame(&mut self, ctx: &Context, surface: SurfaceId, frame: &VideoFrame) {
        let image = ColorImage::from_rgba_unmultiplied([frame.width as usize, frame.height as usize], &frame.data);
        match self.frames.get_mut(&surface) {
            Some(handle) => handle.set(image, egui::TextureOptions::LINEAR),
            None => {
                let handle = ctx.load_texture(format!("frame:{:?}", surface), image, egui::TextureOptions::LINEAR);
                self.frames.insert(surface, handle);
            }
        }
    }

    /// Stop the loader thread and drop every texture. Safe to repeat.
    pub fn shutdown(&mut self) {
        self.loader.shutdown();
        self.frames.clear();
        self.stills.clear();
    }
}

impl Default for MediaTextures {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_still_key(key: &str) -> Option<ItemId> {
    key.strip_prefix("still:")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use std::time::{Duration, Instant};

    #[test]
    fn still_keys_round_trip_item_ids() {
        assert_eq!(parse_still_key(&MediaTextures::still_key(14)), Some(14));
        assert_eq!(parse_still_key("frame:Modal"), None);
    }

    #[test]
    fn broken_still_is_reported_once_and_not_requeued() {
        let ctx = Context::default();
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = sample_catalog();
        let item = &catalog.items()[0];

        let mut textures = MediaTextures::new();
        textures.ensure_still(item, dir.path().join("missing.jpg"));
        assert_eq!(textures.status(item.id), TextureStatus::Pending);

        let deadline = Instant::now() + Duration::from_secs(10);
        let outcomes = loop {
            let outcomes = textures.poll(&ctx);
            if !outcomes.is_empty() {
                break outcomes;
            }
            assert!(Instant::now() < deadline, "loader timed out");
            std::thread::sleep(Duration::from_millis(5));
        };

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].id, item.id);
        assert!(outcomes[0].result.is_err());
        assert_eq!(textures.status(item.id), TextureStatus::Failed);
        assert!(textures.failure(item.id).is_some());

        // Failed stills stay failed instead of being retried every frame
        textures.ensure_still(item, dir.path().join("missing.jpg"));
        assert_eq!(textures.status(item.id), TextureStatus::Failed);
        textures.shutdown();
        textures.shutdown();
    }

    fn frame_2x2() -> VideoFrame {
        VideoFrame {
            data: vec![0; 16],
            width: 2,
            height: 2,
        }
    }

    #[test]
    fn frames_of_unregistered_surfaces_are_dropped() {
        let ctx = Context::default();
        let mut textures = MediaTextures::new();
        let mut playback = PlaybackCoordinator::new();
        playback.register(SurfaceId::Gallery(2), VideoSurface::new("video/a.mp4".into()));

        textures.show_frame(&ctx, SurfaceId::Gallery(2), &frame_2x2());
        assert!(!textures.update_frames(&ctx, &mut playback));
        assert!(textures.frame(SurfaceId::Gallery(2)).is_some());

        playback.unregister(SurfaceId::Gallery(2));
        textures.update_frames(&ctx, &mut playback);
        assert!(textures.frame(SurfaceId::Gallery(2)).is_none());
        textures.shutdown();
    }
}
