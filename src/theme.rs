use eframe::egui::{self, Color32, Context, Rounding};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    pub surface: String,
    pub panel: String,
    pub text: String,
    pub muted_text: String,
    pub accent: String,
    pub accent_soft: String,
    pub border: String,
    pub radius: f32,
    pub font_size_base: f32,
}

pub fn presets() -> Vec<ThemeConfig> {
    vec![
        ThemeConfig {
            name: "mentor_light".to_string(),
            surface: "#f4f6fb".to_string(),
            panel: "#ffffff".to_string(),
            text: "#1d2433".to_string(),
            muted_text: "#5f6b7d".to_string(),
            accent: "#5b5fe8".to_string(),
            accent_soft: "#e4e5ff".to_string(),
            border: "#d4d8e2".to_string(),
            radius: 8.0,
            font_size_base: 15.0,
        },
        ThemeConfig {
            name: "mentor_night".to_string(),
            surface: "#1e2230".to_string(),
            panel: "#151823".to_string(),
            text: "#e8ebf5".to_string(),
            muted_text: "#98a1b8".to_string(),
            accent: "#8c8fff".to_string(),
            accent_soft: "#2c2f52".to_string(),
            border: "#30364a".to_string(),
            radius: 8.0,
            font_size_base: 15.0,
        },
    ]
}

/// Looks up a preset by name, falling back to the first one.
pub fn find_theme(name: &str) -> ThemeConfig {
    let all = presets();
    all.iter()
        .find(|t| t.name == name)
        .cloned()
        .unwrap_or_else(|| all[0].clone())
}

pub fn apply_theme(theme: &ThemeConfig, ctx: &Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = if is_dark(theme) {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    visuals.panel_fill = parse_color(&theme.panel);
    visuals.window_fill = parse_color(&theme.panel);
    visuals.extreme_bg_color = parse_color(&theme.surface);
    visuals.hyperlink_color = parse_color(&theme.accent);
    visuals.selection.bg_fill = parse_color(&theme.accent_soft);

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
    ] {
        widget.bg_fill = parse_color(&theme.surface);
        widget.weak_bg_fill = parse_color(&theme.surface);
        widget.fg_stroke.color = parse_color(&theme.text);
        widget.bg_stroke.color = parse_color(&theme.border);
        widget.rounding = Rounding::same(theme.radius);
    }
    for widget in [&mut visuals.widgets.hovered, &mut visuals.widgets.active] {
        widget.bg_fill = parse_color(&theme.accent_soft);
        widget.weak_bg_fill = parse_color(&theme.accent_soft);
        widget.bg_stroke.color = parse_color(&theme.accent);
        widget.fg_stroke.color = parse_color(&theme.text);
        widget.rounding = Rounding::same(theme.radius);
    }
    visuals.window_rounding = Rounding::same(theme.radius);

    style.text_styles = [
        (
            egui::TextStyle::Small,
            egui::FontId::proportional(theme.font_size_base - 2.0),
        ),
        (
            egui::TextStyle::Body,
            egui::FontId::proportional(theme.font_size_base),
        ),
        (
            egui::TextStyle::Button,
            egui::FontId::proportional(theme.font_size_base),
        ),
        (
            egui::TextStyle::Heading,
            egui::FontId::proportional(theme.font_size_base + 7.0),
        ),
        (
            egui::TextStyle::Monospace,
            egui::FontId::monospace(theme.font_size_base - 1.0),
        ),
    ]
    .into();
    style.visuals = visuals;
    ctx.set_style(style);
}

fn is_dark(theme: &ThemeConfig) -> bool {
    let bg = parse_color(&theme.panel);
    let luminance =
        0.2126 * (bg.r() as f32) + 0.7152 * (bg.g() as f32) + 0.0722 * (bg.b() as f32);
    luminance < 128.0
}

/// `#rrggbb` or `#rrggbbaa`; anything else renders light gray.
pub fn parse_color(hex: &str) -> Color32 {
    let h = hex.trim_start_matches('#');
    match h.len() {
        6 => u32::from_str_radix(h, 16)
            .map(|rgb| {
                let [_, r, g, b] = rgb.to_be_bytes();
                Color32::from_rgb(r, g, b)
            })
            .unwrap_or(Color32::LIGHT_GRAY),
        8 => u32::from_str_radix(h, 16)
            .map(|rgba| {
                let [r, g, b, a] = rgba.to_be_bytes();
                Color32::from_rgba_premultiplied(r, g, b, a)
            })
            .unwrap_or(Color32::LIGHT_GRAY),
        _ => Color32::LIGHT_GRAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_and_eight_digit_hex() {
        assert_eq!(parse_color("#5b5fe8"), Color32::from_rgb(0x5b, 0x5f, 0xe8));
        assert_eq!(
            parse_color("10203040"),
            Color32::from_rgba_premultiplied(0x10, 0x20, 0x30, 0x40)
        );
    }

    #[test]
    fn bad_hex_is_gray() {
        assert_eq!(parse_color("#zzzzzz"), Color32::LIGHT_GRAY);
        assert_eq!(parse_color("#fff"), Color32::LIGHT_GRAY);
    }

    #[test]
    fn night_preset_is_dark() {
        assert!(is_dark(&find_theme("mentor_night")));
        assert!(!is_dark(&find_theme("mentor_light")));
    }

    #[test]
    fn unknown_name_falls_back_to_first_preset() {
        assert_eq!(find_theme("neon").name, "mentor_light");
    }
}
