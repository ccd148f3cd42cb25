//! Colours: btop-style `theme[key]="value"` files mapped onto tiles, ice and board chrome.

use crate::Palette;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const ONEDARK_TILES: [Color; 6] = [
    Color::Rgb(0x98, 0xC3, 0x79),
    Color::Rgb(0xE5, 0xC0, 0x7B),
    Color::Rgb(0xE0, 0x6C, 0x75),
    Color::Rgb(0x61, 0xAF, 0xEF),
    Color::Rgb(0xC6, 0x78, 0xDD),
    Color::Rgb(0x56, 0xB6, 0xC2),
];

const HIGH_CONTRAST_TILES: [Color; 6] = [
    Color::Rgb(0x00, 0xFF, 0x00),
    Color::Rgb(0xFF, 0xFF, 0x00),
    Color::Rgb(0xFF, 0x00, 0x00),
    Color::Rgb(0x00, 0x88, 0xFF),
    Color::Rgb(0xFF, 0x00, 0xFF),
    Color::Rgb(0x00, 0xFF, 0xFF),
];

// Paul Tol's vibrant scheme
const COLORBLIND_TILES: [Color; 6] = [
    Color::Rgb(0x00, 0x77, 0xBB),
    Color::Rgb(0xEE, 0x77, 0x33),
    Color::Rgb(0x00, 0x99, 0x88),
    Color::Rgb(0xCC, 0x33, 0x11),
    Color::Rgb(0xEE, 0x33, 0x77),
    Color::Rgb(0xBB, 0xBB, 0x00),
];

/// Every colour the board and sidebar draw with.
#[derive(Debug, Clone)]
pub struct Theme {
    /// One colour per tile type.
    pub tiles: [Color; 6],
    /// Cell background.
    pub bg: Color,
    /// Background of a cell still under ice.
    pub ice: Color,
    pub div_line: Color,
    pub main_fg: Color,
    pub title: Color,
    pub inactive_fg: Color,
    /// Cursor outline.
    pub cursor: Color,
    /// Selected cell outline.
    pub selected: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            tiles: ONEDARK_TILES,
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            ice: Color::Rgb(0x4B, 0x6E, 0x8C),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
            cursor: Color::Rgb(0xFF, 0xFF, 0xFF),
            selected: Color::Rgb(0xE5, 0xC0, 0x7B),
        }
    }
}

impl Theme {
    /// Load a theme file, falling back to One Dark when `path` is missing. `palette`
    /// then overrides the tile colours.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            _ => Self::default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.tiles = HIGH_CONTRAST_TILES;
                self.cursor = Color::White;
            }
            Palette::Colorblind => self.tiles = COLORBLIND_TILES,
        }
    }

    /// Tile colours come from `tile0`..`tile5`, falling back to the btop keys a stock
    /// theme already defines.
    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k).and_then(|v| parse_hex(v).ok()));
        let fallback = Self::default();
        let tile_keys: [&[&str]; 6] = [
            &["tile0", "mem_box", "cpu_start"],
            &["tile1", "cpu_mid", "title"],
            &["tile2", "cpu_end", "temp_end"],
            &["tile3", "cpu_box"],
            &["tile4", "net_box"],
            &["tile5", "hi_fg", "proc_misc"],
        ];
        let mut tiles = fallback.tiles;
        for (slot, keys) in tiles.iter_mut().zip(tile_keys) {
            if let Some(c) = get(keys) {
                *slot = c;
            }
        }
        Self {
            tiles,
            bg: get(&["meter_bg"]).unwrap_or(fallback.bg),
            ice: get(&["ice", "selected_bg"]).unwrap_or(fallback.ice),
            div_line: get(&["div_line"]).unwrap_or(fallback.div_line),
            main_fg: get(&["main_fg"]).unwrap_or(fallback.main_fg),
            title: get(&["title"]).unwrap_or(fallback.title),
            inactive_fg: get(&["inactive_fg"]).unwrap_or(fallback.inactive_fg),
            cursor: get(&["cursor", "selected_fg"]).unwrap_or(fallback.cursor),
            selected: get(&["selected", "hi_fg"]).unwrap_or(fallback.selected),
        }
    }

    #[inline]
    pub fn tile_color(&self, kind: u8) -> Color {
        self.tiles[usize::from(kind) % self.tiles.len()]
    }
}

/// Parse a btop-style theme file into a key -> value map. Blank lines and `#`
/// comments are skipped.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let rest = l.strip_prefix("theme[")?;
            let (key, rest) = rest.split_once(']')?;
            let (_, value) = rest.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Parse `#RRGGBB` or `#RGB`.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(hex.to_string());
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(bad)
    };
    match hex.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        assert_eq!(parse_hex("#98C379").unwrap(), Color::Rgb(0x98, 0xC3, 0x79));
    }

    #[test]
    fn test_parse_hex_3() {
        assert_eq!(parse_hex("#FFF").unwrap(), Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_parse_theme_file() {
        let map = parse_theme_file(
            "# comment\ntheme[meter_bg]=\"#31353F\"\ntheme[tile2]='#FF0000'\ntheme[empty]=\"\"",
        );
        assert_eq!(map.get("meter_bg").map(String::as_str), Some("#31353F"));
        assert_eq!(map.get("tile2").map(String::as_str), Some("#FF0000"));
        assert!(!map.contains_key("empty"));
    }

    #[test]
    fn test_tile_keys_override_btop_keys() {
        let map = parse_theme_file("theme[cpu_box]=\"#000001\"\ntheme[tile3]=\"#000002\"\ntheme[net_box]=\"#000003\"");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.tile_color(3), Color::Rgb(0, 0, 2));
        assert_eq!(theme.tile_color(4), Color::Rgb(0, 0, 3));
        assert_eq!(theme.tile_color(0), ONEDARK_TILES[0]);
    }

    #[test]
    fn test_palette_replaces_tiles() {
        let mut theme = Theme::default();
        theme.apply_palette(Palette::Colorblind);
        assert_eq!(theme.tiles, COLORBLIND_TILES);
    }
}
