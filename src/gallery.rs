// Gallery grid state - tiles, reveal tracking and tap detection
use std::collections::HashSet;

use egui::Pos2;
use rand::Rng;

use crate::catalog::{ItemId, MediaCatalog, MediaItem};
use crate::config::GalleryConfig;
use crate::gesture::{Gesture, PointerPress, TouchThresholds};
use crate::playback::{MediaElement, PlaybackCoordinator, PlaybackError, SurfaceId};
use crate::view_filter::{self, ViewMode, ViewState};

/// Grid of tiles rendered from the current view
#[derive(Debug, Default)]
pub struct GalleryView {
    view: ViewState,
    /// Bumped on every render so per-tile UI ids never leak across views
    generation: u64,
    /// Tiles whose reveal transition already fired
    revealed: HashSet<ItemId>,
    /// Press in progress on a tile
    press: Option<(ItemId, PointerPress)>,
}

impl GalleryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn items(&self) -> &[MediaItem] {
        self.view.items()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the whole tile set.
    ///
    /// Every surface of the previous tiles is detached first, so nothing from
    /// the old view keeps playing or stays registered.
    pub fn render<E: MediaElement>(
        &mut self,
        view: ViewState,
        playback: &mut PlaybackCoordinator<E>,
        mut make_surface: impl FnMut(&MediaItem) -> E,
    ) {
        playback.unregister_where(|id| matches!(id, SurfaceId::Gallery(_)));

        for item in view.items().iter().filter(|item| item.is_video()) {
            playback.register(SurfaceId::Gallery(item.id), make_surface(item));
        }

        tracing::debug!("Rendering gallery: {:?} with {} items", view.mode(), view.len());
        self.view = view;
        self.generation += 1;
        self.revealed.clear();
        self.press = None;
    }

    /// Filter or shuffle. Every video on the page stops, carousel tiles
    /// included, before the derived view is rendered.
    pub fn switch_view<E: MediaElement, R: Rng + ?Sized>(
        &mut self,
        catalog: &MediaCatalog,
        mode: &ViewMode,
        rng: &mut R,
        playback: &mut PlaybackCoordinator<E>,
        make_surface: impl FnMut(&MediaItem) -> E,
    ) {
        playback.stop_all();
        let view = view_filter::derive(catalog, mode, rng);
        self.render(view, playback, make_surface);
    }

    /// Mark a tile as near the viewport. True only the first time.
    pub fn reveal(&mut self, id: ItemId) -> bool {
        self.revealed.insert(id)
    }

    pub fn is_revealed(&self, id: ItemId) -> bool {
        self.revealed.contains(&id)
    }

    pub fn is_touching(&self, id: ItemId) -> bool {
        self.press.is_some_and(|(pressed, _)| pressed == id)
    }

    pub fn press_began(&mut self, id: ItemId, time: f64, position: Pos2) {
        self.press = Some((id, PointerPress::begin(time, position)));
    }

    /// Finish a press; returns the item to open in the modal when it was a tap
    pub fn press_ended(&mut self, time: f64, position: Pos2, thresholds: &TouchThresholds) -> Option<ItemId> {
        let (id, press) = self.press.take()?;
        match press.finish(time, position, thresholds) {
            Gesture::Tap => Some(id),
            Gesture::Scroll => None,
        }
    }

    pub fn press_cancelled(&mut self) {
        self.press = None;
    }

    /// Per-tile play control. Independent of tap-to-open.
    pub fn toggle_video<E: MediaElement>(
        &self,
        id: ItemId,
        playback: &mut PlaybackCoordinator<E>,
    ) -> Result<(), PlaybackError> {
        playback.toggle(SurfaceId::Gallery(id))
    }

    /// "Colección Premium · 5 elementos"
    pub fn status_line(&self, config: &GalleryConfig) -> String {
        let count = self.view.len();
        let suffix = if count == 1 { "" } else { "s" };
        format!(
            "{} · {} elemento{}",
            config.category_name(self.view.mode().tag()),
            count,
            suffix
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::config::CategoryInfo;
    use crate::playback::tests::FakeElement;
    use crate::playback::PlaybackState;
    use crate::view_filter::{filter_by_category, shuffle};
    use egui::pos2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rendered(tag: &str) -> (GalleryView, PlaybackCoordinator<FakeElement>) {
        let catalog = sample_catalog();
        let mut gallery = GalleryView::new();
        let mut playback = PlaybackCoordinator::new();
        gallery.render(filter_by_category(&catalog, tag), &mut playback, |_| FakeElement::default());
        (gallery, playback)
    }

    #[test]
    fn render_registers_one_surface_per_video_tile() {
        let (gallery, playback) = rendered("all");
        assert_eq!(gallery.items().len(), 5);
        assert!(playback.contains(SurfaceId::Gallery(2)));
        assert!(playback.contains(SurfaceId::Gallery(3)));
        assert!(!playback.contains(SurfaceId::Gallery(0)));
    }

    #[test]
    fn rerender_detaches_previous_tiles() {
        let catalog = sample_catalog();
        let (mut gallery, mut playback) = rendered("all");
        gallery.toggle_video(2, &mut playback).expect("play");
        gallery.reveal(0);

        gallery.render(filter_by_category(&catalog, "a"), &mut playback, |_| FakeElement::default());

        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(!playback.contains(SurfaceId::Gallery(2)));
        assert!(!gallery.is_revealed(0));
        assert_eq!(gallery.generation(), 2);
    }

    #[test]
    fn repeated_renders_do_not_accumulate_surfaces() {
        let catalog = sample_catalog();
        let (mut gallery, mut playback) = rendered("all");
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            gallery.render(shuffle(&catalog, &mut rng), &mut playback, |_| FakeElement::default());
        }
        playback.register(SurfaceId::Modal, FakeElement::default());
        playback.unregister_where(|id| matches!(id, SurfaceId::Gallery(_)));
        assert!(playback.contains(SurfaceId::Modal));
        assert!(!playback.contains(SurfaceId::Gallery(2)));
    }

    #[test]
    fn carousel_surfaces_survive_gallery_render() {
        let catalog = sample_catalog();
        let (mut gallery, mut playback) = rendered("all");
        playback.register(SurfaceId::Carousel(2), FakeElement::default());
        playback.request_play(SurfaceId::Carousel(2)).expect("play");

        gallery.render(filter_by_category(&catalog, "b"), &mut playback, |_| FakeElement::default());
        assert!(playback.is_active(SurfaceId::Carousel(2)));
    }

    #[test]
    fn switching_view_stops_a_playing_carousel_video() {
        let catalog = sample_catalog();
        let (mut gallery, mut playback) = rendered("all");
        playback.register(SurfaceId::Carousel(2), FakeElement::default());
        playback.request_play(SurfaceId::Carousel(2)).expect("play");
        let mut rng = StdRng::seed_from_u64(9);

        gallery.switch_view(&catalog, &ViewMode::from_tag("b"), &mut rng, &mut playback, |_| FakeElement::default());

        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.playing_count(), 0);
        assert!(playback.contains(SurfaceId::Carousel(2)));
        assert_eq!(gallery.view().mode().tag(), "b");
    }

    #[test]
    fn shuffling_stops_a_playing_tile_video() {
        let catalog = sample_catalog();
        let (mut gallery, mut playback) = rendered("all");
        gallery.toggle_video(3, &mut playback).expect("play");
        let mut rng = StdRng::seed_from_u64(4);

        gallery.switch_view(&catalog, &ViewMode::from_tag("shuffle"), &mut rng, &mut playback, |_| FakeElement::default());

        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(gallery.items().len(), catalog.len());
    }

    #[test]
    fn reveal_fires_once_per_tile() {
        let (mut gallery, _) = rendered("all");
        assert!(gallery.reveal(1));
        assert!(!gallery.reveal(1));
        assert!(gallery.is_revealed(1));
    }

    #[test]
    fn tap_opens_but_scroll_does_not() {
        let t = TouchThresholds::default();
        let (mut gallery, _) = rendered("all");

        gallery.press_began(1, 5.0, pos2(50.0, 50.0));
        assert!(gallery.is_touching(1));
        assert_eq!(gallery.press_ended(5.15, pos2(53.0, 50.0), &t), Some(1));
        assert!(!gallery.is_touching(1));

        gallery.press_began(1, 6.0, pos2(50.0, 50.0));
        assert_eq!(gallery.press_ended(6.15, pos2(50.0, 90.0), &t), None);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let t = TouchThresholds::default();
        let (mut gallery, _) = rendered("all");
        assert_eq!(gallery.press_ended(1.0, pos2(0.0, 0.0), &t), None);
        gallery.press_began(0, 1.0, pos2(0.0, 0.0));
        gallery.press_cancelled();
        assert_eq!(gallery.press_ended(1.1, pos2(0.0, 0.0), &t), None);
    }

    #[test]
    fn tile_videos_are_mutually_exclusive() {
        let (gallery, mut playback) = rendered("all");
        gallery.toggle_video(2, &mut playback).expect("play 2");
        gallery.toggle_video(3, &mut playback).expect("play 3");
        assert!(playback.is_active(SurfaceId::Gallery(3)));
        assert_eq!(playback.playing_count(), 1);
    }

    #[test]
    fn status_line_uses_display_names_and_plural() {
        let mut config = GalleryConfig::default();
        config.categories.push(CategoryInfo {
            key: "b".to_string(),
            name: "Colección B".to_string(),
        });

        let (gallery, _) = rendered("b");
        assert_eq!(gallery.status_line(&config), "Colección B · 2 elementos");

        let catalog = crate::catalog::MediaCatalog::from_entries(&[crate::catalog::tests::entry(
            "x.jpg",
            crate::catalog::MediaKind::Image,
            "b",
            false,
        )]);
        let mut single = GalleryView::new();
        let mut playback = PlaybackCoordinator::<FakeElement>::new();
        single.render(filter_by_category(&catalog, "b"), &mut playback, |_| FakeElement::default());
        assert_eq!(single.status_line(&config), "Colección B · 1 elemento");
    }

    #[test]
    fn empty_view_renders_as_empty_state() {
        let (gallery, playback) = rendered("missing");
        assert!(gallery.is_empty());
        assert_eq!(playback.playing_count(), 0);
    }
}
