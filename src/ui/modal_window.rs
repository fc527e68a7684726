// Lightbox overlay - dimmed backdrop, media, navigation and video controls
use eframe::egui;
use egui::{Color32, Rect};

use super::style::{self, format_duration};
use super::tile::{paint_image, paint_placeholder};
use crate::cache::MediaTextures;
use crate::config::GalleryConfig;
use crate::media::VideoSurface;
use crate::modal::{ModalController, ModalMedia};
use crate::playback::{PlaybackCoordinator, SurfaceId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModalAction {
    Close,
    Prev,
    Next,
    TogglePlayback,
    ToggleMute,
    ToggleFullscreen,
    /// Drag over the media area, from press to release
    Swipe(egui::Vec2),
    /// Seek the modal video (0.0 to 1.0)
    Seek(f64),
}

pub fn show_modal(
    ctx: &egui::Context,
    modal: &ModalController,
    playback: &PlaybackCoordinator<VideoSurface>,
    textures: &mut MediaTextures,
    config: &GalleryConfig,
) -> Vec<ModalAction> {
    let mut actions = Vec::new();
    let Some(item) = modal.current_item().cloned() else {
        return actions;
    };

    let screen = ctx.screen_rect();
    let panel = Rect::from_center_size(
        screen.center(),
        egui::vec2((screen.width() * 0.9).min(1100.0), screen.height() * 0.9),
    );

    egui::Area::new(egui::Id::new("modal-root"))
        .order(egui::Order::Foreground)
        .fixed_pos(screen.min)
        .show(ctx, |ui| {
            let backdrop = ui.allocate_rect(screen, egui::Sense::click());
            ui.painter().rect_filled(screen, 0.0, Color32::from_rgba_unmultiplied(0, 0, 0, 215));

            if backdrop.clicked() && backdrop.interact_pointer_pos().is_some_and(|pos| !panel.contains(pos)) {
                actions.push(ModalAction::Close);
            }

            let mut content = ui.new_child(egui::UiBuilder::new().max_rect(panel.shrink(12.0)));

            // Title, counter, close
            content.horizontal(|ui| {
                ui.label(egui::RichText::new(&item.title).size(20.0).strong().color(style::TEXT));
                if let Some(counter) = modal.counter_text() {
                    ui.label(egui::RichText::new(counter).color(style::TEXT_MUTED));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✕").on_hover_text("Esc").clicked() {
                        actions.push(ModalAction::Close);
                    }
                });
            });

            let controls = item.is_video() && config.sections.video_controls;
            let footer = if controls { 110.0 } else { 70.0 };

            content.horizontal(|ui| {
                let media_height = (ui.available_height() - footer).max(120.0);
                if ui.add(egui::Button::new("◀").min_size(egui::vec2(40.0, media_height))).clicked() {
                    actions.push(ModalAction::Prev);
                }

                let media_width = (ui.available_width() - 48.0).max(120.0);
                let (media_rect, response) =
                    ui.allocate_exact_size(egui::vec2(media_width, media_height), egui::Sense::click_and_drag());
                paint_media(ui, media_rect, modal, &item, playback, textures, config);
                track_swipe(ui, &response, &mut actions);

                if item.is_video() && response.clicked() {
                    actions.push(ModalAction::TogglePlayback);
                }

                if ui.add(egui::Button::new("▶").min_size(egui::vec2(40.0, media_height))).clicked() {
                    actions.push(ModalAction::Next);
                }
            });

            if controls {
                video_controls(&mut content, modal, playback, &mut actions);
            }

            if !item.description.is_empty() {
                content.label(egui::RichText::new(&item.description).color(style::TEXT_MUTED));
            }
        });

    actions
}

fn paint_media(
    ui: &egui::Ui,
    rect: Rect,
    modal: &ModalController,
    item: &crate::catalog::MediaItem,
    playback: &PlaybackCoordinator<VideoSurface>,
    textures: &mut MediaTextures,
    config: &GalleryConfig,
) {
    let painter = ui.painter();
    painter.rect_filled(rect, 4.0, style::BG_DARK);

    match modal.media() {
        ModalMedia::Empty => {}
        ModalMedia::Loading => paint_placeholder(painter, rect, "◆", "", 1.0),
        ModalMedia::Failed(_) => {
            let message = if item.is_video() { &config.messages.video_error } else { &config.messages.image_error };
            paint_placeholder(painter, rect, "⚠", message, 1.0);
        }
        ModalMedia::Ready => {
            let texture = textures.frame(SurfaceId::Modal).or_else(|| textures.still(item.id));
            if let Some(texture) = texture {
                paint_image(painter, texture.id, fit(texture.size, rect), 1.0);
            }
        }
    }

    if playback.has_failed(SurfaceId::Modal) {
        painter.text(
            rect.center_bottom() - egui::vec2(0.0, 24.0),
            egui::Align2::CENTER_CENTER,
            &config.messages.video_error,
            egui::FontId::proportional(14.0),
            style::ERROR,
        );
    }
}

/// Press origin is kept in egui memory until the drag ends
fn track_swipe(ui: &egui::Ui, response: &egui::Response, actions: &mut Vec<ModalAction>) {
    let key = response.id.with("swipe-origin");
    if response.drag_started() {
        if let Some(origin) = response.interact_pointer_pos() {
            ui.data_mut(|d| d.insert_temp(key, origin));
        }
    }
    if response.drag_stopped() {
        let origin: Option<egui::Pos2> = ui.data_mut(|d| d.remove_temp(key));
        let end = ui.ctx().input(|i| i.pointer.latest_pos());
        if let (Some(origin), Some(end)) = (origin, end) {
            actions.push(ModalAction::Swipe(end - origin));
        }
    }
}

fn video_controls(
    ui: &mut egui::Ui,
    modal: &ModalController,
    playback: &PlaybackCoordinator<VideoSurface>,
    actions: &mut Vec<ModalAction>,
) {
    let surface = playback.surface(SurfaceId::Modal);
    let playing = playback.is_active(SurfaceId::Modal);

    ui.horizontal(|ui| {
        if ui.button(if playing { "⏸" } else { "▶" }).on_hover_text("Espacio").clicked() {
            actions.push(ModalAction::TogglePlayback);
        }

        let mut position = surface.map_or(0.0, VideoSurface::progress) as f32;
        let slider = egui::Slider::new(&mut position, 0.0..=1.0).show_value(false).trailing_fill(true);
        if ui.add_sized([(ui.available_width() - 220.0).max(60.0), 20.0], slider).changed() {
            actions.push(ModalAction::Seek(position as f64));
        }

        let (current, duration) = surface.map_or((0.0, 0.0), VideoSurface::times);
        ui.label(
            egui::RichText::new(format!("{} / {}", format_duration(current), format_duration(duration)))
                .color(style::TEXT_MUTED),
        );

        if ui.button(if modal.is_muted() { "🔇" } else { "🔊" }).on_hover_text("M").clicked() {
            actions.push(ModalAction::ToggleMute);
        }
        if ui.button("⛶").on_hover_text("F").clicked() {
            actions.push(ModalAction::ToggleFullscreen);
        }
    });
}

/// Largest rect with the texture's aspect ratio centered in `bounds`
fn fit(size: egui::Vec2, bounds: Rect) -> Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return bounds;
    }
    let scale = (bounds.width() / size.x).min(bounds.height() / size.y);
    Rect::from_center_size(bounds.center(), size * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_letterboxes_wide_media() {
        let bounds = Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(400.0, 400.0));
        let fitted = fit(egui::vec2(1600.0, 900.0), bounds);
        assert_eq!(fitted.width(), 400.0);
        assert_eq!(fitted.height(), 225.0);
        assert_eq!(fitted.center(), bounds.center());
    }

    #[test]
    fn fit_keeps_bounds_for_empty_textures() {
        let bounds = Rect::from_min_size(egui::pos2(10.0, 10.0), egui::vec2(50.0, 80.0));
        assert_eq!(fit(egui::Vec2::ZERO, bounds), bounds);
    }
}
