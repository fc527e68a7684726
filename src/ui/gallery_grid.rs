// Gallery grid - tiles of the current view with lazy reveal and tap-to-open
use std::collections::HashSet;
use std::time::Instant;

use eframe::egui;

use super::style;
use super::tile::{draw_tile, TileFlags};
use crate::cache::MediaTextures;
use crate::catalog::ItemId;
use crate::config::GalleryConfig;
use crate::feedback::NoticeBoard;
use crate::gallery::GalleryView;
use crate::gesture::TouchThresholds;
use crate::media::VideoSurface;
use crate::playback::{PlaybackCoordinator, SurfaceId};

const MIN_TILE_WIDTH: f32 = 240.0;
const MAX_COLUMNS: usize = 5;
const SPACING: f32 = 16.0;
const CAPTION_HEIGHT: f32 = 44.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAction {
    /// A tap landed on the tile outside its play control
    Open(ItemId),
    ToggleVideo(ItemId),
}

#[derive(Debug, Default)]
pub struct GridOutput {
    pub actions: Vec<GridAction>,
    /// Video surfaces with at least part of their tile on screen
    pub visible: HashSet<SurfaceId>,
    pub scroll_offset: f32,
}

pub fn show_gallery_grid(
    ui: &mut egui::Ui,
    gallery: &mut GalleryView,
    playback: &PlaybackCoordinator<VideoSurface>,
    textures: &mut MediaTextures,
    config: &GalleryConfig,
    thresholds: &TouchThresholds,
    notices: &NoticeBoard,
) -> GridOutput {
    let mut output = GridOutput::default();

    if gallery.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(egui::RichText::new("◇").size(48.0).color(style::TEXT_MUTED));
            ui.add_space(12.0);
            ui.label(egui::RichText::new(&config.messages.empty_view).size(20.0).strong());
        });
        return output;
    }

    let ctx = ui.ctx().clone();
    let (pressed, released, pointer, time) = ctx.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.interact_pos(),
            i.time,
        )
    });

    let available_width = ui.available_width();
    let columns = ((available_width / MIN_TILE_WIDTH).floor() as usize).clamp(1, MAX_COLUMNS);
    let card_width = (available_width - SPACING * (columns as f32 - 1.0)) / columns as f32;
    let card_height = card_width * 0.75 + CAPTION_HEIGHT;
    let generation = gallery.generation();
    let margin = config.performance.reveal_margin;
    let fade_secs = config.performance.reveal_fade_secs;

    let items = gallery.items().to_vec();
    let now = Instant::now();

    let scroll = egui::ScrollArea::vertical()
        .id_salt("gallery-grid")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(SPACING, SPACING);
                let viewport = ui.clip_rect();

                for item in &items {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(card_width, card_height), egui::Sense::hover());

                    if viewport.expand(margin).intersects(rect) {
                        gallery.reveal(item.id);
                    }
                    // Tiles start hidden so the first reveal fades in
                    let revealed = gallery.is_revealed(item.id);
                    let reveal = ctx.animate_bool_with_time(egui::Id::new(("reveal", generation, item.id)), revealed, fade_secs);
                    if !revealed {
                        continue;
                    }
                    textures.ensure_still(item, config.resolve_src(&item.src));

                    if !ui.is_rect_visible(rect) {
                        continue;
                    }

                    let surface = SurfaceId::Gallery(item.id);
                    if item.is_video() {
                        output.visible.insert(surface);
                    }

                    let flags = TileFlags {
                        hovered: ui.rect_contains_pointer(rect),
                        touching: gallery.is_touching(item.id),
                        playing: playback.is_active(surface),
                        play_failed: playback.has_failed(surface),
                        controls: config.sections.video_controls,
                        reveal,
                        notice: notices.current(surface, now),
                    };

                    let control = draw_tile(ui, rect, item, textures.frame(surface), flags, textures, &config.messages);

                    if let Some(control) = control {
                        let response = ui.interact(control, egui::Id::new(("tile-control", generation, item.id)), egui::Sense::click());
                        if response.clicked() {
                            output.actions.push(GridAction::ToggleVideo(item.id));
                        }
                    }

                    // Presses on the play control or under an overlay never start a tap
                    if let Some(pos) = pointer.filter(|_| pressed) {
                        let on_top = ctx.layer_id_at(pos) == Some(ui.layer_id());
                        if on_top && rect.contains(pos) && viewport.contains(pos) && !control.is_some_and(|c| c.contains(pos)) {
                            gallery.press_began(item.id, time, pos);
                        }
                    }
                }
            });
        });

    if released {
        match pointer {
            Some(pos) => {
                if let Some(id) = gallery.press_ended(time, pos, thresholds) {
                    output.actions.push(GridAction::Open(id));
                }
            }
            None => gallery.press_cancelled(),
        }
    }

    output.scroll_offset = scroll.state.offset.y;
    output
}
