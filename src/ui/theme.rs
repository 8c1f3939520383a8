use ratatui::style::Color;

/// Dashboard palette (Catppuccin Mocha).
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text_primary: Color,
    pub text_secondary: Color,
    pub surface_bg: Color,
    pub overlay_border: Color,
    pub accent: Color,
    pub header_accent_fg: Color,
    pub header_accent_bg: Color,
    pub gauge_filled: Color,
    pub gauge_unfilled: Color,
    pub sparkline_cpu: Color,
    pub sparkline_ram: Color,
    pub sparkline_sent: Color,
    pub sparkline_recv: Color,
    pub statusbar_bg: Color,
    pub pill_key_fg: Color,
    pub pill_key_bg: Color,
    pub pill_desc_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub status_warn: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(166, 173, 200),
            surface_bg: Color::Rgb(49, 50, 68),
            overlay_border: Color::Rgb(108, 112, 134),
            accent: Color::Rgb(203, 166, 247),
            header_accent_fg: Color::Rgb(17, 17, 27),
            header_accent_bg: Color::Rgb(166, 227, 161),
            gauge_filled: Color::Rgb(137, 180, 250),
            gauge_unfilled: Color::Rgb(49, 50, 68),
            sparkline_cpu: Color::Rgb(249, 226, 175),
            sparkline_ram: Color::Rgb(137, 180, 250),
            sparkline_sent: Color::Rgb(148, 226, 213),
            sparkline_recv: Color::Rgb(245, 194, 231),
            statusbar_bg: Color::Rgb(24, 24, 37),
            pill_key_fg: Color::Rgb(17, 17, 27),
            pill_key_bg: Color::Rgb(137, 180, 250),
            pill_desc_fg: Color::Rgb(205, 214, 244),
            status_ok: Color::Rgb(166, 227, 161),
            status_err: Color::Rgb(243, 139, 168),
            status_warn: Color::Rgb(250, 179, 135),
        }
    }
}

/// Gauge colour by load: calm below 60%, warning below 85%, hot above.
pub fn load_color(theme: &Theme, percent: f64) -> Color {
    if percent >= 85.0 {
        theme.status_err
    } else if percent >= 60.0 {
        theme.status_warn
    } else {
        theme.gauge_filled
    }
}
