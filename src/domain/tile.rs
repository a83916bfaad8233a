/// Tile definitions and the tile-type table.
///
/// The world grid stores plain indices; everything a tile *means*
/// (its glyph and whether it blocks movement) lives in a `TileSet`
/// so tile semantics are centralized here.
///
/// A `TileSet` is either the built-in table or one read from a
/// `tiles.toml` file:
///
/// ```toml
/// [[tile]]
/// name = "grass"
/// glyph = "."
/// fg = [90, 170, 70]
/// bg = [40, 90, 35]
/// collidable = false
/// ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Plain RGB colour; the renderer maps it to a terminal colour.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Immutable pairing of a visual reference and a collision flag.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tile {
    pub name: String,
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
    collidable: bool,
}

impl Tile {
    pub fn new(name: &str, glyph: char, fg: Rgb, bg: Rgb, collidable: bool) -> Self {
        Tile { name: name.to_string(), glyph, fg, bg, collidable }
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TileSetError {
    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("tile table parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("tile table defines no tiles")]
    Empty,
}

/// Indexed table of tile definitions. Index 0 is the default tile that
/// replaces any invalid index found in map data.
#[derive(Clone, Debug)]
pub struct TileSet {
    tiles: Vec<Tile>,
}

// ── TOML schema ──

#[derive(Deserialize, Debug)]
struct TomlTileSet {
    #[serde(default)]
    tile: Vec<TomlTile>,
}

#[derive(Deserialize, Debug)]
struct TomlTile {
    name: String,
    #[serde(default = "default_glyph")]
    glyph: String,
    #[serde(default = "default_fg")]
    fg: [u8; 3],
    #[serde(default = "default_bg")]
    bg: [u8; 3],
    #[serde(default)]
    collidable: bool,
}

fn default_glyph() -> String { " ".into() }
fn default_fg() -> [u8; 3] { [200, 200, 200] }
fn default_bg() -> [u8; 3] { [22, 22, 35] }

impl TileSet {
    pub const DEFAULT_INDEX: usize = 0;

    /// Built-in table used when no tile file is configured or it fails to load.
    pub fn builtin() -> Self {
        let t = |name, glyph, fg, bg, solid| Tile::new(name, glyph, fg, bg, solid);
        TileSet {
            tiles: vec![
                t("grass",         ' ',  Rgb(90, 170, 70),   Rgb(46, 110, 44),  false), // 0
                t("sand",          '·',  Rgb(200, 180, 110), Rgb(196, 170, 96), false), // 1
                t("water",         '~',  Rgb(140, 190, 255), Rgb(38, 92, 170),  true),  // 2
                t("tree",          '♣',  Rgb(20, 70, 20),    Rgb(46, 110, 44),  true),  // 3
                t("path",          ' ',  Rgb(150, 120, 80),  Rgb(150, 118, 76), false), // 4
                t("rock wall",     '▓',  Rgb(120, 120, 130), Rgb(70, 70, 80),   true),  // 5
                t("bridge",        '═',  Rgb(90, 60, 30),    Rgb(140, 100, 60), false), // 6
                t("flowers",       '*',  Rgb(240, 200, 80),  Rgb(46, 110, 44),  false), // 7
                t("deep water",    '≈',  Rgb(90, 130, 220),  Rgb(20, 50, 120),  true),  // 8
                t("shallow water", '~',  Rgb(170, 210, 255), Rgb(70, 130, 190), false), // 9
            ],
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, TileSetError> {
        let parsed: TomlTileSet = toml::from_str(text)?;
        if parsed.tile.is_empty() {
            return Err(TileSetError::Empty);
        }
        let tiles = parsed.tile.into_iter().map(|t| {
            let glyph = t.glyph.chars().next().unwrap_or(' ');
            Tile::new(
                &t.name, glyph,
                Rgb(t.fg[0], t.fg[1], t.fg[2]),
                Rgb(t.bg[0], t.bg[1], t.bg[2]),
                t.collidable,
            )
        }).collect();
        Ok(TileSet { tiles })
    }

    pub fn from_file(path: &Path) -> Result<Self, TileSetError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| TileSetError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    /// Load the configured table, falling back to the built-in one.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else { return Self::builtin() };
        match Self::from_file(path) {
            Ok(set) => {
                log::info!("Loaded {} tiles from {}", set.len(), path.display());
                set
            }
            Err(e) => {
                log::warn!("{e}; using built-in tiles");
                Self::builtin()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn is_valid(&self, index: usize) -> bool {
        index < self.tiles.len()
    }

    /// Unknown indices block movement.
    pub fn is_collidable(&self, index: usize) -> bool {
        self.tiles.get(index).map_or(true, Tile::is_collidable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_default_tile_is_walkable() {
        let set = TileSet::builtin();
        assert!(!set.is_collidable(TileSet::DEFAULT_INDEX));
        assert!(set.is_collidable(2)); // water
        assert!(set.is_collidable(3)); // tree
    }

    #[test]
    fn unknown_index_is_collidable() {
        let set = TileSet::builtin();
        assert!(!set.is_valid(500));
        assert!(set.is_collidable(500));
    }

    #[test]
    fn parses_tile_table() {
        let text = r##"
            [[tile]]
            name = "floor"
            glyph = "."

            [[tile]]
            name = "wall"
            glyph = "#"
            fg = [1, 2, 3]
            collidable = true
        "##;
        let set = TileSet::from_toml_str(text).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.is_collidable(0));
        let wall = set.get(1).unwrap();
        assert_eq!(wall.glyph, '#');
        assert_eq!(wall.fg, Rgb(1, 2, 3));
        assert!(wall.is_collidable());
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(TileSet::from_toml_str(""), Err(TileSetError::Empty)));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let set = TileSet::load(Some(Path::new("/definitely/not/here/tiles.toml")));
        assert_eq!(set.len(), TileSet::builtin().len());
    }
}
