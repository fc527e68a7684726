// Featured carousel strip - buttons, indicators, swipe, wheel and arrow keys
use std::collections::HashSet;
use std::time::{Duration, Instant};

use eframe::egui;
use egui::Rect;

use super::style;
use super::tile::{draw_tile, TileFlags};
use crate::cache::MediaTextures;
use crate::carousel::{CarouselInput, CarouselState, DeviceClass, StripPosition};
use crate::catalog::{ItemId, MediaCatalog};
use crate::config::GalleryConfig;
use crate::feedback::NoticeBoard;
use crate::gesture::{Debouncer, Gesture, PointerPress, TouchThresholds};
use crate::media::VideoSurface;
use crate::playback::{PlaybackCoordinator, SurfaceId};

const HEADING: &str = "Piezas destacadas";
const BUTTON_WIDTH: f32 = 36.0;
const CAPTION_HEIGHT: f32 = 44.0;
const SLIDE_SECS: f32 = 0.35;
/// One wheel step per burst
const WHEEL_QUIET: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StripAction {
    Input(CarouselInput),
    Open(ItemId),
    ToggleVideo(ItemId),
}

#[derive(Debug, Default)]
pub struct StripOutput {
    pub actions: Vec<StripAction>,
    pub visible: HashSet<SurfaceId>,
    /// Pointer over the strip or a press in progress on it
    pub engaged: bool,
}

/// Pointer state the strip carries between frames
#[derive(Debug)]
pub struct StripInteraction {
    press: Option<PointerPress>,
    wheel_gate: Debouncer,
    /// Index and layout the scroll offset was last applied for
    scrolled_to: Option<(usize, DeviceClass)>,
}

impl Default for StripInteraction {
    fn default() -> Self {
        Self {
            press: None,
            wheel_gate: Debouncer::new(WHEEL_QUIET),
            scrolled_to: None,
        }
    }
}

impl StripInteraction {
    /// Force the scroll offset to be re-applied next frame
    pub fn invalidate(&mut self) {
        self.scrolled_to = None;
    }

    /// First wheel event of a burst steps; the rest of the burst is swallowed
    fn wheel_step(&mut self, now: Instant) -> bool {
        let fresh = !self.wheel_gate.is_pending() || self.wheel_gate.fire(now);
        self.wheel_gate.poke(now);
        fresh
    }
}

struct PlacedTile {
    id: ItemId,
    rect: Rect,
    control: Option<Rect>,
}

#[allow(clippy::too_many_arguments)]
pub fn show_carousel_strip(
    ui: &mut egui::Ui,
    carousel: &CarouselState,
    catalog: &MediaCatalog,
    class: DeviceClass,
    interaction: &mut StripInteraction,
    playback: &PlaybackCoordinator<VideoSurface>,
    textures: &mut MediaTextures,
    config: &GalleryConfig,
    thresholds: &TouchThresholds,
    notices: &NoticeBoard,
) -> StripOutput {
    let mut output = StripOutput::default();

    ui.label(egui::RichText::new(HEADING).size(18.0).strong().color(style::GOLD));
    ui.add_space(4.0);

    if carousel.is_empty() {
        ui.label(egui::RichText::new(&config.messages.empty_featured).color(style::TEXT_MUTED));
        return output;
    }

    let ctx = ui.ctx().clone();
    let tile = class.tile(&config.carousel);
    let tile_size = egui::vec2(tile.width, tile.width * 0.75 + CAPTION_HEIGHT);
    let mut placed = Vec::with_capacity(carousel.len());
    let now = Instant::now();
    let tiles = TileContext {
        catalog,
        playback,
        config,
        notices,
        now,
    };

    let viewport = ui
        .horizontal(|ui| {
            let at_start = carousel.index() == 0;
            let at_end = carousel.index() + 1 >= carousel.len();

            if ui.add_enabled(!at_start, egui::Button::new("◀").min_size(egui::vec2(BUTTON_WIDTH, tile_size.y))).clicked() {
                output.actions.push(StripAction::Input(CarouselInput::Prev));
            }

            let width = (ui.available_width() - BUTTON_WIDTH - ui.spacing().item_spacing.x).max(tile.width);
            let viewport = match carousel.position(class, &config.carousel) {
                StripPosition::Translate(offset) => {
                    let (viewport, _) = ui.allocate_exact_size(egui::vec2(width, tile_size.y), egui::Sense::hover());
                    let offset = ctx.animate_value_with_time(egui::Id::new("carousel-offset"), offset, SLIDE_SECS);
                    let mut strip = ui.new_child(egui::UiBuilder::new().max_rect(viewport));
                    strip.set_clip_rect(viewport.intersect(ui.clip_rect()));

                    for (i, &id) in carousel.items().iter().enumerate() {
                        let rect = Rect::from_min_size(
                            egui::pos2(viewport.left() + i as f32 * tile.stride() + offset, viewport.top()),
                            tile_size,
                        );
                        if strip.is_rect_visible(rect) {
                            placed.push(paint_strip_tile(&strip, id, rect, &tiles, textures, &mut output));
                        }
                    }
                    viewport
                }
                StripPosition::ScrollTo(offset) => {
                    let mut area = egui::ScrollArea::horizontal()
                        .id_salt("carousel-strip")
                        .max_width(width)
                        .auto_shrink([false, true]);
                    if interaction.scrolled_to != Some((carousel.index(), class)) {
                        area = area.horizontal_scroll_offset(offset);
                        interaction.scrolled_to = Some((carousel.index(), class));
                    }
                    area.show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.spacing_mut().item_spacing.x = tile.gap;
                            for &id in carousel.items() {
                                let (rect, _) = ui.allocate_exact_size(tile_size, egui::Sense::hover());
                                if ui.is_rect_visible(rect) {
                                    placed.push(paint_strip_tile(ui, id, rect, &tiles, textures, &mut output));
                                }
                            }
                        });
                    })
                    .inner_rect
                }
            };

            if ui.add_enabled(!at_end, egui::Button::new("▶").min_size(egui::vec2(BUTTON_WIDTH, tile_size.y))).clicked() {
                output.actions.push(StripAction::Input(CarouselInput::Next));
            }

            viewport
        })
        .inner;

    // Indicators
    ui.horizontal(|ui| {
        let dots_width = carousel.len() as f32 * 18.0;
        ui.add_space(((ui.available_width() - dots_width) / 2.0).max(0.0));
        for i in 0..carousel.len() {
            let (rect, response) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::click());
            let color = if carousel.is_indicator_active(i) { style::ACCENT } else { style::BORDER };
            ui.painter().circle_filled(rect.center(), 5.0, color);
            if response.clicked() {
                output.actions.push(StripAction::Input(CarouselInput::Indicator(i)));
            }
        }
    });

    handle_pointer(ui, viewport, &placed, interaction, thresholds, &mut output);
    output
}

/// Read-only state every strip tile is painted from
struct TileContext<'a> {
    catalog: &'a MediaCatalog,
    playback: &'a PlaybackCoordinator<VideoSurface>,
    config: &'a GalleryConfig,
    notices: &'a NoticeBoard,
    now: Instant,
}

fn paint_strip_tile(
    ui: &egui::Ui,
    id: ItemId,
    rect: Rect,
    tiles: &TileContext<'_>,
    textures: &mut MediaTextures,
    output: &mut StripOutput,
) -> PlacedTile {
    let TileContext { catalog, playback, config, notices, now } = *tiles;
    let Some(item) = catalog.get(id) else {
        return PlacedTile { id, rect, control: None };
    };
    textures.ensure_still(item, config.resolve_src(&item.src));

    let surface = SurfaceId::Carousel(id);
    if item.is_video() {
        output.visible.insert(surface);
    }

    let flags = TileFlags {
        hovered: ui.rect_contains_pointer(rect),
        touching: false,
        playing: playback.is_active(surface),
        play_failed: playback.has_failed(surface),
        controls: config.sections.video_controls,
        reveal: 1.0,
        notice: notices.current(surface, now),
    };
    let control = draw_tile(ui, rect, item, textures.frame(surface), flags, textures, &config.messages);

    if let Some(control) = control {
        let response = ui.interact(control, egui::Id::new(("carousel-control", id)), egui::Sense::click());
        if response.clicked() {
            output.actions.push(StripAction::ToggleVideo(id));
        }
    }

    PlacedTile { id, rect, control }
}

/// Drags become swipes, short presses on a tile open it, the wheel and
/// arrow keys step while the pointer is over the strip
fn handle_pointer(
    ui: &egui::Ui,
    viewport: Rect,
    placed: &[PlacedTile],
    interaction: &mut StripInteraction,
    thresholds: &TouchThresholds,
    output: &mut StripOutput,
) {
    let ctx = ui.ctx();
    let (pressed, released, pointer, time, scroll, left, right) = ctx.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.interact_pos(),
            i.time,
            i.raw_scroll_delta,
            i.key_pressed(egui::Key::ArrowLeft),
            i.key_pressed(egui::Key::ArrowRight),
        )
    });

    let over_strip = pointer.is_some_and(|pos| viewport.contains(pos) && ctx.layer_id_at(pos) == Some(ui.layer_id()));
    output.engaged = over_strip || interaction.press.is_some();

    if pressed && over_strip {
        if let Some(pos) = pointer {
            let on_control = placed.iter().any(|t| t.control.is_some_and(|c| c.contains(pos)));
            if !on_control {
                interaction.press = Some(PointerPress::begin(time, pos));
            }
        }
    }

    if released {
        if let (Some(press), Some(pos)) = (interaction.press.take(), pointer) {
            if let Some(swipe) = press.swipe(pos, thresholds) {
                output.actions.push(StripAction::Input(CarouselInput::Swipe(swipe)));
            } else if press.finish(time, pos, thresholds) == Gesture::Tap {
                if let Some(tile) = placed.iter().find(|t| t.rect.contains(pos)) {
                    output.actions.push(StripAction::Open(tile.id));
                }
            }
        }
    }

    if !over_strip {
        return;
    }

    let wheel = if scroll.x.abs() > scroll.y.abs() { -scroll.x } else { -scroll.y };
    if wheel != 0.0 && interaction.wheel_step(Instant::now()) {
        output.actions.push(StripAction::Input(CarouselInput::Wheel(wheel)));
    }

    if left {
        output.actions.push(StripAction::Input(CarouselInput::ArrowLeft));
    }
    if right {
        output.actions.push(StripAction::Input(CarouselInput::ArrowRight));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_bursts_step_once() {
        let mut interaction = StripInteraction::default();
        let start = Instant::now();

        assert!(interaction.wheel_step(start));
        assert!(!interaction.wheel_step(start + Duration::from_millis(40)));
        assert!(!interaction.wheel_step(start + Duration::from_millis(120)));
        // A new burst after a quiet gap steps again
        assert!(interaction.wheel_step(start + Duration::from_millis(600)));
    }
}
