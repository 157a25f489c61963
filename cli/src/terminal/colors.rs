use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::Cyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::BrightBlue;
pub const IPV4_PREFIX: Color = Color::Blue;
pub const MAC_ADDR: Color = Color::Magenta;
pub const UNRESOLVED: Color = Color::BrightBlack;
pub const TAG: Color = Color::Yellow;
