//! Brand palette used across the UI. Fixed, no runtime theming.

use ratatui::style::Color;

pub const DARK_BLUE: Color = Color::Rgb(0x0e, 0x24, 0x55);
pub const TURQUOISE: Color = Color::Rgb(0x12, 0xc3, 0xd6);
pub const ORANGE: Color = Color::Rgb(0xf5, 0xa6, 0x23);
pub const WHITE: Color = Color::Rgb(0xff, 0xff, 0xff);
