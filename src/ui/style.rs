// Emerald palette and global egui style
use eframe::egui;
use egui::Color32;

pub const BG_DARK: Color32 = Color32::from_rgb(10, 18, 15);
pub const BG_PANEL: Color32 = Color32::from_rgb(14, 24, 20);
pub const BG_CARD: Color32 = Color32::from_rgb(20, 32, 27);
pub const BG_CARD_HOVER: Color32 = Color32::from_rgb(27, 42, 36);
pub const BORDER: Color32 = Color32::from_rgb(38, 58, 50);
pub const TEXT: Color32 = Color32::from_rgb(236, 244, 240);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(128, 150, 140);
pub const ACCENT: Color32 = Color32::from_rgb(46, 204, 113);
pub const GOLD: Color32 = Color32::from_rgb(212, 175, 55);
pub const ERROR: Color32 = Color32::from_rgb(230, 100, 100);

pub const CARD_ROUNDING: f32 = 8.0;

pub fn setup_custom_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.dark_mode = true;
    style.visuals.panel_fill = BG_DARK;
    style.visuals.window_fill = BG_PANEL;
    style.visuals.extreme_bg_color = BG_DARK;
    style.visuals.faint_bg_color = BG_CARD;

    style.visuals.widgets.noninteractive.bg_fill = BG_CARD;
    style.visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT);
    style.visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    style.visuals.widgets.noninteractive.rounding = egui::Rounding::same(8.0);

    style.visuals.widgets.inactive.bg_fill = Color32::from_rgb(30, 46, 40);
    style.visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    style.visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    style.visuals.widgets.inactive.rounding = egui::Rounding::same(8.0);

    style.visuals.widgets.hovered.bg_fill = BG_CARD_HOVER;
    style.visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT);
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ACCENT);
    style.visuals.widgets.hovered.rounding = egui::Rounding::same(8.0);

    style.visuals.widgets.active.bg_fill = Color32::from_rgb(36, 60, 50);
    style.visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, TEXT);
    style.visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, ACCENT);
    style.visuals.widgets.active.rounding = egui::Rounding::same(8.0);

    style.visuals.selection.bg_fill = ACCENT.linear_multiply(0.25);
    style.visuals.selection.stroke = egui::Stroke::new(1.0, ACCENT);

    style.visuals.window_rounding = egui::Rounding::same(12.0);
    style.visuals.menu_rounding = egui::Rounding::same(8.0);

    style.visuals.window_shadow = egui::Shadow {
        offset: egui::vec2(0.0, 4.0),
        blur: 16.0,
        spread: 0.0,
        color: Color32::from_rgba_unmultiplied(0, 0, 0, 80),
    };

    style.visuals.popup_shadow = egui::Shadow {
        offset: egui::vec2(0.0, 2.0),
        blur: 12.0,
        spread: 0.0,
        color: Color32::from_rgba_unmultiplied(0, 0, 0, 60),
    };

    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    style.spacing.window_margin = egui::Margin::same(16.0);
    style.spacing.button_padding = egui::vec2(14.0, 6.0);

    ctx.set_style(style);
}

/// Format seconds as MM:SS or HH:MM:SS
pub fn format_duration(seconds: f64) -> String {
    let total_secs = seconds.max(0.0) as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
