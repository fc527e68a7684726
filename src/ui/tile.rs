// Tile painting shared by the gallery grid and the carousel strip
use eframe::egui;
use egui::{Color32, Rect};

use super::style::{self, CARD_ROUNDING};
use crate::cache::{MediaTextures, TextureStatus};
use crate::catalog::MediaItem;
use crate::config::Messages;
use crate::feedback::Notice;

/// Radius of the round play control on video tiles
pub const CONTROL_RADIUS: f32 = 24.0;

/// Per-frame visual flags of one tile
#[derive(Debug, Clone, Copy)]
pub struct TileFlags {
    pub hovered: bool,
    pub touching: bool,
    pub playing: bool,
    /// Last play request was rejected
    pub play_failed: bool,
    /// Draw the play control for video tiles
    pub controls: bool,
    /// Reveal transition progress, 0 (hidden) to 1
    pub reveal: f32,
    /// Transient playback notice and its opacity
    pub notice: Option<(Notice, f32)>,
}

/// Draw a tile. Returns the play-control rect for video tiles with controls.
pub fn draw_tile(
    ui: &egui::Ui,
    rect: Rect,
    item: &MediaItem,
    frame: Option<egui::load::SizedTexture>,
    flags: TileFlags,
    textures: &mut MediaTextures,
    messages: &Messages,
) -> Option<Rect> {
    let alpha = flags.reveal.clamp(0.0, 1.0);
    // Slide in from slightly below while fading
    let rect = rect.translate(egui::vec2(0.0, (1.0 - alpha) * 16.0));
    let painter = ui.painter().with_clip_rect(ui.clip_rect());
    let fade = |c: Color32| c.gamma_multiply(alpha);

    let bg_color = if flags.hovered { style::BG_CARD_HOVER } else { style::BG_CARD };
    let border_color = if flags.playing {
        style::ACCENT
    } else if flags.hovered || flags.touching {
        style::GOLD
    } else {
        style::BORDER
    };

    painter.rect_filled(rect, CARD_ROUNDING, fade(bg_color));

    let media_rect = Rect::from_min_size(rect.min, egui::vec2(rect.width(), rect.height() - 44.0));

    match (frame, textures.status(item.id)) {
        (Some(texture), _) => paint_image(&painter, texture.id, media_rect, alpha),
        (None, TextureStatus::Ready) => {
            if let Some(texture) = textures.still(item.id) {
                paint_image(&painter, texture.id, media_rect, alpha);
            }
        }
        (None, TextureStatus::Failed) => {
            let message = if item.is_video() { &messages.video_error } else { &messages.image_error };
            paint_placeholder(&painter, media_rect, "⚠", message, alpha);
        }
        (None, _) => paint_placeholder(&painter, media_rect, "◆", "", alpha),
    }

    painter.rect_stroke(rect, CARD_ROUNDING, egui::Stroke::new(1.0, fade(border_color)));

    // Title under the media
    let title_galley = painter.layout(
        item.title.clone(),
        egui::FontId::proportional(13.0),
        fade(style::TEXT),
        rect.width() - 20.0,
    );
    painter.galley(
        egui::pos2(rect.left() + 10.0, media_rect.bottom() + 8.0),
        title_galley,
        fade(style::TEXT),
    );

    if flags.play_failed {
        let badge = Rect::from_min_size(media_rect.left_top() + egui::vec2(8.0, 8.0), egui::vec2(media_rect.width() - 16.0, 22.0));
        painter.rect_filled(badge, 4.0, Color32::from_rgba_unmultiplied(60, 10, 10, 200));
        painter.text(
            badge.center(),
            egui::Align2::CENTER_CENTER,
            &messages.video_error,
            egui::FontId::proportional(11.0),
            fade(style::ERROR),
        );
    }

    if let Some((notice, opacity)) = flags.notice {
        paint_notice(&painter, media_rect, messages.notice(notice), opacity * alpha);
    }

    if !item.is_video() || !flags.controls {
        return None;
    }

    let center = media_rect.center();
    let control = Rect::from_center_size(center, egui::vec2(CONTROL_RADIUS * 2.0, CONTROL_RADIUS * 2.0));
    let ring = if flags.playing { style::ACCENT } else { Color32::from_rgba_unmultiplied(0, 0, 0, 140) };
    painter.circle_filled(center, CONTROL_RADIUS, fade(ring));
    painter.text(
        center,
        egui::Align2::CENTER_CENTER,
        if flags.playing { "⏸" } else { "▶" },
        egui::FontId::proportional(18.0),
        fade(Color32::WHITE),
    );
    Some(control)
}

pub fn paint_image(painter: &egui::Painter, texture: egui::TextureId, rect: Rect, alpha: f32) {
    painter.image(
        texture,
        rect,
        Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        Color32::WHITE.gamma_multiply(alpha),
    );
}

fn paint_notice(painter: &egui::Painter, media_rect: Rect, message: &str, opacity: f32) {
    let text_color = style::TEXT.gamma_multiply(opacity);
    let galley = painter.layout_no_wrap(message.to_string(), egui::FontId::proportional(12.0), text_color);
    let size = galley.size() + egui::vec2(20.0, 10.0);
    let pill = Rect::from_center_size(
        egui::pos2(media_rect.center().x, media_rect.bottom() - 12.0 - size.y / 2.0),
        size,
    );
    painter.rect_filled(pill, size.y / 2.0, Color32::from_rgba_unmultiplied(0, 0, 0, 180).gamma_multiply(opacity));
    painter.galley(pill.center() - galley.size() / 2.0, galley, text_color);
}

/// Stand-in for media that is loading or failed to load
pub fn paint_placeholder(painter: &egui::Painter, rect: Rect, icon: &str, message: &str, alpha: f32) {
    painter.rect_filled(
        rect,
        egui::Rounding { nw: CARD_ROUNDING, ne: CARD_ROUNDING, sw: 0.0, se: 0.0 },
        style::BG_DARK.gamma_multiply(alpha),
    );
    painter.text(
        rect.center() - egui::vec2(0.0, 10.0),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(22.0),
        style::TEXT_MUTED.gamma_multiply(alpha),
    );
    if !message.is_empty() {
        painter.text(
            rect.center() + egui::vec2(0.0, 16.0),
            egui::Align2::CENTER_CENTER,
            message,
            egui::FontId::proportional(12.0),
            style::TEXT_MUTED.gamma_multiply(alpha),
        );
    }
}
