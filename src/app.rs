use eframe::egui;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::{MediaTextures, TextureStatus};
use crate::carousel::{AutoAdvance, CarouselState, DeviceClass};
use crate::catalog::{ItemId, MediaCatalog, MediaKind};
use crate::config::GalleryConfig;
use crate::feedback::{Notice, NoticeBoard};
use crate::gallery::GalleryView;
use crate::gesture::{Debouncer, TouchThresholds};
use crate::media::VideoSurface;
use crate::modal::{LoadTicket, ModalController, ModalEvent, ModalKey};
use crate::playback::{self, MediaElement, PlaybackCoordinator, PlaybackState, SurfaceId};
use crate::ui::{self, style, GridAction, ModalAction, StripAction, StripInteraction};
use crate::view_filter::{ViewMode, SHUFFLE};

/// Main application state
pub struct GalleryApp {
    config: GalleryConfig,

    /// Shared, read-only catalog
    catalog: Arc<MediaCatalog>,

    /// The one place video play/pause goes through
    playback: PlaybackCoordinator<VideoSurface>,

    gallery: GalleryView,
    carousel: CarouselState,
    modal: ModalController,

    /// Stills, live frames and the background loader
    textures: MediaTextures,

    thresholds: TouchThresholds,

    // --- Carousel layout state ---
    strip: StripInteraction,
    autoplay: AutoAdvance,
    device_class: DeviceClass,
    last_width: f32,
    resize: Debouncer,

    // --- Scroll-out-of-view tracking ---
    scroll: Debouncer,
    last_scroll_offset: f32,
    /// Video surfaces drawn on screen this frame
    visible: HashSet<SurfaceId>,

    /// Modal media load still in flight
    pending_modal: Option<LoadTicket>,

    /// "Reproduciendo" / "Pausado" / "Video completado" over tiles
    notices: NoticeBoard,

    torn_down: bool,
}

impl GalleryApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: GalleryConfig) -> Self {
        let catalog = Arc::new(MediaCatalog::from_entries(&config.media_items));
        let quiet = Duration::from_millis(config.performance.debounce_ms);

        let mut app = Self {
            thresholds: TouchThresholds::from(&config.touch),
            device_class: DeviceClass::Desktop,
            modal: ModalController::new(Arc::clone(&catalog)),
            catalog,
            playback: PlaybackCoordinator::new(),
            gallery: GalleryView::new(),
            carousel: CarouselState::default(),
            textures: MediaTextures::new(),
            strip: StripInteraction::default(),
            autoplay: AutoAdvance::new(Duration::from_millis(config.carousel.autoplay_ms), Instant::now()),
            last_width: 0.0,
            resize: Debouncer::new(quiet),
            scroll: Debouncer::new(quiet),
            last_scroll_offset: 0.0,
            visible: HashSet::new(),
            pending_modal: None,
            notices: NoticeBoard::new(),
            torn_down: false,
            config,
        };

        if app.config.sections.gallery {
            app.apply_view(ViewMode::All);
        }
        if app.config.sections.carousel {
            app.render_carousel();
        }

        tracing::info!(
            "Gallery ready: {} items, {} featured",
            app.catalog.len(),
            app.carousel.len()
        );
        app
    }

    /// Stop playback and replace the gallery with a freshly derived view
    fn apply_view(&mut self, mode: ViewMode) {
        let config = &self.config;
        self.gallery.switch_view(&self.catalog, &mode, &mut rand::rng(), &mut self.playback, |item| {
            VideoSurface::new(config.resolve_src(&item.src))
        });
    }

    fn render_carousel(&mut self) {
        self.playback.unregister_where(|id| matches!(id, SurfaceId::Carousel(_)));

        let featured = self.catalog.featured();
        for item in featured.iter().filter(|item| item.is_video()) {
            self.playback.register(
                SurfaceId::Carousel(item.id),
                VideoSurface::new(self.config.resolve_src(&item.src)),
            );
        }
        self.carousel.render(&featured);
        self.strip.invalidate();
    }

    fn open_modal(&mut self, id: ItemId) {
        if !self.config.sections.modal {
            return;
        }
        if let Some(index) = self.modal.open(id, &mut self.playback) {
            self.load_modal(index);
        }
    }

    /// Attach the media of the modal's new index and start its still loading
    fn load_modal(&mut self, index: usize) {
        let (Some(ticket), Some(item)) = (self.modal.ticket(), self.catalog.get(index)) else {
            return;
        };
        let path = self.config.resolve_src(&item.src);

        let video = item.is_video().then(|| {
            let mut surface = VideoSurface::new(path.clone());
            surface.set_muted(self.modal.is_muted());
            surface
        });
        attach_modal_video(&mut self.playback, &mut self.textures, video);

        self.textures.ensure_still(item, path);
        self.pending_modal = None;
        match self.textures.status(index) {
            TextureStatus::Ready => {
                self.modal.media_loaded(ticket);
            }
            TextureStatus::Failed => {
                let reason = self.textures.failure(index).unwrap_or_default().to_string();
                self.modal.media_failed(ticket, reason);
            }
            TextureStatus::Pending | TextureStatus::Missing => self.pending_modal = Some(ticket),
        }

        // Warm up both neighbours so prev/next feel instant
        if let Some((prev, next)) = self.modal.neighbours() {
            for id in [prev, next] {
                if let Some(item) = self.catalog.get(id) {
                    self.textures.ensure_still(item, self.config.resolve_src(&item.src));
                }
            }
        }
    }

    fn close_modal(&mut self) {
        self.modal.close(&mut self.playback);
        self.textures.forget_frame(SurfaceId::Modal);
        self.pending_modal = None;
    }

    fn handle_modal_event(&mut self, ctx: &egui::Context, event: ModalEvent) {
        match event {
            ModalEvent::Navigated(index) => self.load_modal(index),
            ModalEvent::Closed => {
                self.textures.forget_frame(SurfaceId::Modal);
                self.pending_modal = None;
            }
            ModalEvent::ToggleFullscreen => toggle_fullscreen(ctx),
            ModalEvent::MuteToggled(muted) => tracing::debug!("Modal muted: {}", muted),
            ModalEvent::PlaybackToggled | ModalEvent::Ignored => {}
        }
    }

    fn apply_modal_action(&mut self, ctx: &egui::Context, action: ModalAction) {
        match action {
            ModalAction::Close => self.close_modal(),
            ModalAction::Prev => {
                if let Some(index) = self.modal.prev(&mut self.playback) {
                    self.load_modal(index);
                }
            }
            ModalAction::Next => {
                if let Some(index) = self.modal.next(&mut self.playback) {
                    self.load_modal(index);
                }
            }
            ModalAction::TogglePlayback => {
                // A rejection is flagged on the surface and drawn inline
                let _ = self.modal.toggle_playback(&mut self.playback);
            }
            ModalAction::ToggleMute => {
                self.modal.toggle_mute(&mut self.playback);
            }
            ModalAction::ToggleFullscreen => toggle_fullscreen(ctx),
            ModalAction::Swipe(delta) => {
                let event = self.modal.handle_swipe(delta, &self.thresholds, &mut self.playback);
                self.handle_modal_event(ctx, event);
            }
            ModalAction::Seek(position) => {
                if let Some(surface) = self.playback.surface_mut(SurfaceId::Modal) {
                    surface.seek(position);
                }
            }
        }
    }

    /// Keyboard shortcuts of the open modal; Escape stops playback otherwise
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if !self.modal.is_open() {
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.playback.stop_all();
            }
            return;
        }

        let keys = ctx.input(|i| {
            [
                (egui::Key::Escape, ModalKey::Escape),
                (egui::Key::ArrowLeft, ModalKey::ArrowLeft),
                (egui::Key::ArrowRight, ModalKey::ArrowRight),
                (egui::Key::Space, ModalKey::Space),
                (egui::Key::F, ModalKey::F),
                (egui::Key::M, ModalKey::M),
            ]
            .into_iter()
            .filter(|(key, _)| i.key_pressed(*key))
            .map(|(_, modal_key)| modal_key)
            .collect::<Vec<_>>()
        });

        for key in keys {
            let event = self.modal.handle_key(key, &mut self.playback);
            self.handle_modal_event(ctx, event);
        }
    }

    /// Finished stills; the modal only accepts the load it is still waiting for
    fn poll_media(&mut self, ctx: &egui::Context) {
        for outcome in self.textures.poll(ctx) {
            let resolved = self.modal.resolve_load(&mut self.pending_modal, outcome.id, outcome.result);
            if resolved == Some(false) {
                tracing::debug!("Discarding stale modal load for item {}", outcome.id);
            }
        }
    }

    /// Coalesce window resizes before switching the carousel layout
    fn track_resize(&mut self, ctx: &egui::Context, now: Instant) {
        let width = ctx.screen_rect().width();
        if self.last_width == 0.0 {
            self.device_class = DeviceClass::for_width(width, &self.config.breakpoints);
        } else if (width - self.last_width).abs() > 0.5 {
            self.resize.poke(now);
        }
        self.last_width = width;

        if self.resize.fire(now) {
            let class = DeviceClass::for_width(width, &self.config.breakpoints);
            if class != self.device_class {
                tracing::debug!("Layout changed: {:?} -> {:?}", self.device_class, class);
                self.device_class = class;
                self.strip.invalidate();
            }
        }
    }

    /// After a scroll burst settles, stop a tile video that left the screen
    fn track_scroll(&mut self, offset: f32, now: Instant) {
        if (offset - self.last_scroll_offset).abs() > f32::EPSILON {
            self.scroll.poke(now);
        }
        self.last_scroll_offset = offset;

        if !self.scroll.fire(now) {
            return;
        }
        if let Some(active) = playback::offscreen_tile(self.playback.state(), &self.visible) {
            tracing::debug!("{:?} scrolled out of view", active);
            self.playback.stop_all();
        }
    }

    /// Play or pause a tile video and flash the matching notice
    fn toggle_tile(&mut self, surface: SurfaceId, now: Instant) {
        let result = match surface {
            SurfaceId::Gallery(id) => self.gallery.toggle_video(id, &mut self.playback),
            _ => self.playback.toggle(surface),
        };
        let playing = self.playback.is_active(surface);
        self.notices.toggled(surface, &result, playing, now);
    }

    /// Step the featured strip when its timer runs out unattended
    fn tick_autoplay(&mut self, engaged: bool, now: Instant) {
        let carousel_playing = matches!(self.playback.state(), PlaybackState::Playing(SurfaceId::Carousel(_)));
        let held = engaged || carousel_playing || self.modal.is_open();
        if let Some(input) = self.autoplay.tick(now, held, self.carousel.len()) {
            self.carousel.apply(input);
            tracing::trace!("Carousel autoplay to {:?}", self.carousel.current());
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        let mut selected_mode: Option<ViewMode> = None;

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::none()
                .fill(style::BG_PANEL)
                .stroke(egui::Stroke::new(1.0, style::BORDER))
                .inner_margin(egui::Margin::symmetric(16.0, 0.0))
            )
            .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Esmeraldas").size(18.0).strong().color(style::ACCENT));
                ui.add_space(8.0);
                ui.label(egui::RichText::new(format!(
                    "{} imágenes · {} videos",
                    self.catalog.count_kind(MediaKind::Image),
                    self.catalog.count_kind(MediaKind::Video),
                )).color(style::TEXT_MUTED));
            });

            if self.config.sections.gallery {
                ui.add_space(4.0);
                ui.horizontal_wrapped(|ui| {
                    let current = self.gallery.view().mode().tag().to_string();
                    for category in &self.config.categories {
                        let label = if category.key == SHUFFLE {
                            format!("🔀 {}", category.name)
                        } else {
                            format!("{} ({})", category.name, self.catalog.count_in(&category.key))
                        };
                        let active = current == category.key;
                        // Shuffle always re-derives; other tabs only when switching
                        if ui.selectable_label(active, label).clicked() && (!active || category.key == SHUFFLE) {
                            selected_mode = Some(ViewMode::from_tag(&category.key));
                        }
                    }
                });
            }
            ui.add_space(8.0);
        });

        if let Some(mode) = selected_mode {
            self.apply_view(mode);
        }
    }

    fn show_content(&mut self, ctx: &egui::Context, now: Instant) -> f32 {
        let mut grid_actions = Vec::new();
        let mut strip_actions = Vec::new();
        let mut strip_engaged = false;
        let mut scroll_offset = self.last_scroll_offset;
        self.visible.clear();

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.config.sections.carousel {
                let strip = ui::show_carousel_strip(
                    ui,
                    &self.carousel,
                    &self.catalog,
                    self.device_class,
                    &mut self.strip,
                    &self.playback,
                    &mut self.textures,
                    &self.config,
                    &self.thresholds,
                    &self.notices,
                );
                strip_actions = strip.actions;
                strip_engaged = strip.engaged;
                self.visible.extend(strip.visible);
                ui.add_space(8.0);
                ui.separator();
            }

            if self.config.sections.gallery {
                ui.label(egui::RichText::new(self.gallery.status_line(&self.config)).color(style::TEXT_MUTED));
                ui.add_space(4.0);
                let grid = ui::show_gallery_grid(
                    ui,
                    &mut self.gallery,
                    &self.playback,
                    &mut self.textures,
                    &self.config,
                    &self.thresholds,
                    &self.notices,
                );
                grid_actions = grid.actions;
                self.visible.extend(grid.visible);
                scroll_offset = grid.scroll_offset;
            }
        });

        if !strip_actions.is_empty() {
            self.autoplay.restart(now);
        }
        for action in strip_actions {
            match action {
                StripAction::Input(input) => {
                    let index = self.carousel.apply(input);
                    tracing::debug!("Carousel at {} after {:?}", index, input);
                }
                StripAction::Open(id) => self.open_modal(id),
                StripAction::ToggleVideo(id) => self.toggle_tile(SurfaceId::Carousel(id), now),
            }
        }
        if self.config.sections.carousel {
            self.tick_autoplay(strip_engaged, now);
        }

        for action in grid_actions {
            match action {
                GridAction::Open(id) => self.open_modal(id),
                GridAction::ToggleVideo(id) => self.toggle_tile(SurfaceId::Gallery(id), now),
            }
        }

        scroll_offset
    }

    /// Stop everything and release every resource. Safe to call repeatedly.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.close_modal();
        self.playback.teardown();
        self.textures.shutdown();
        self.notices.clear();
        tracing::info!("Gallery torn down");
    }
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.poll_media(ctx);
        self.track_resize(ctx, now);

        if let Some(id) = self.playback.poll_ended() {
            tracing::debug!("{:?} reached the end", id);
            self.notices.post(id, Notice::Completed, now);
        }
        // A decoder that died shows the failure badge instead of a frozen frame
        if let Some(id) = self.playback.poll_errored() {
            self.textures.forget_frame(id);
        }

        // Request repaint during video playback
        if self.textures.update_frames(ctx, &mut self.playback) {
            ctx.request_repaint();
        }

        self.handle_keys(ctx);
        self.show_header(ctx);
        let scroll_offset = self.show_content(ctx, now);
        self.track_scroll(scroll_offset, now);

        if self.modal.is_open() {
            let actions = ui::show_modal(ctx, &self.modal, &self.playback, &mut self.textures, &self.config);
            for action in actions {
                self.apply_modal_action(ctx, action);
            }
        }

        // Keep polling while loads or debounced handlers are outstanding
        if self.pending_modal.is_some() || self.resize.is_pending() || self.scroll.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
        if self.notices.tick(now) {
            ctx.request_repaint_after(Duration::from_millis(30));
        }
        if self.config.sections.carousel {
            if let Some(wait) = self.autoplay.remaining(now) {
                ctx.request_repaint_after(wait);
            }
        }
    }
}

impl Drop for GalleryApp {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Swap the modal's video element. The previous item's last frame goes with
/// it so the new item never shows a stale picture.
fn attach_modal_video(
    playback: &mut PlaybackCoordinator<VideoSurface>,
    textures: &mut MediaTextures,
    video: Option<VideoSurface>,
) {
    playback.unregister(SurfaceId::Modal);
    textures.forget_frame(SurfaceId::Modal);
    if let Some(surface) = video {
        playback.register(SurfaceId::Modal, surface);
    }
}

fn toggle_fullscreen(ctx: &egui::Context) {
    let fullscreen = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
    ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::VideoFrame;

    fn modal_frame(textures: &mut MediaTextures, ctx: &egui::Context) {
        let frame = VideoFrame { data: vec![0; 16], width: 2, height: 2 };
        textures.show_frame(ctx, SurfaceId::Modal, &frame);
    }

    #[test]
    fn moving_between_modal_videos_drops_the_old_frame() {
        let ctx = egui::Context::default();
        let mut textures = MediaTextures::new();
        let mut playback = PlaybackCoordinator::new();

        attach_modal_video(&mut playback, &mut textures, Some(VideoSurface::new("video/2.mp4".into())));
        modal_frame(&mut textures, &ctx);
        assert!(textures.frame(SurfaceId::Modal).is_some());

        attach_modal_video(&mut playback, &mut textures, Some(VideoSurface::new("video/3.mp4".into())));
        textures.update_frames(&ctx, &mut playback);

        assert!(playback.contains(SurfaceId::Modal));
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(textures.frame(SurfaceId::Modal).is_none());
        textures.shutdown();
    }

    #[test]
    fn moving_from_a_video_to_an_image_releases_the_modal_surface() {
        let ctx = egui::Context::default();
        let mut textures = MediaTextures::new();
        let mut playback = PlaybackCoordinator::new();

        attach_modal_video(&mut playback, &mut textures, Some(VideoSurface::new("video/2.mp4".into())));
        modal_frame(&mut textures, &ctx);

        attach_modal_video(&mut playback, &mut textures, None);
        assert!(!playback.contains(SurfaceId::Modal));
        assert!(textures.frame(SurfaceId::Modal).is_none());
        textures.shutdown();
    }
}
