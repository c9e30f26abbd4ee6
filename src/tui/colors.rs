//! Color constants for the terminal chart.

use ratatui::style::Color;

use crate::fields::Curve;

/// Baseline plan line
pub const AMBER: Color = Color::Rgb(245, 158, 11);
/// Expected plan line
pub const PURPLE: Color = Color::Rgb(147, 51, 234);
/// Actual progress line
pub const GREEN: Color = Color::Rgb(16, 185, 129);
/// Day cursor
pub const CURSOR_GRAY: Color = Color::Rgb(110, 110, 110);

pub fn curve_color(curve: Curve) -> Color {
    match curve {
        Curve::Baseline => AMBER,
        Curve::Planned => PURPLE,
        Curve::Actual => GREEN,
    }
}
