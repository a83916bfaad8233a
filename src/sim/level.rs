/// World map loading and initial object placement.
///
/// ## Map format (`.txt`):
///   `rows` lines, each with `cols` whitespace-separated tile indices.
///   ```
///   2 2 2 2 ...
///   2 1 1 1 ...
///   2 1 0 0 ...
///   ```
///
/// Ingestion never fails on bad cells: missing rows, short rows,
/// unparsable tokens and unknown tile indices all become tile 0 and are
/// logged. Only an unreadable or empty file is an error, in which case
/// the caller keeps whatever grid it already had.

use std::path::{Path, PathBuf};

use crate::domain::grid::TileGrid;
use crate::domain::object::{GameObject, ObjectKind, ObjectRegistry};
use crate::domain::tile::TileSet;
use crate::sim::event::GameEvent;
use crate::sim::world::WorldState;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("could not read map {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("map {path} is empty")]
    Empty { path: PathBuf },
}

// ── Built-in tile indices used by the fallback world ──

const GRASS: usize = 0;
const SAND: usize = 1;
const TREE: usize = 3;
const DEEP_WATER: usize = 8;

/// (kind, col, row) for every object in a fresh game.
const OBJECT_PLACEMENTS: &[(ObjectKind, i32, i32)] = &[
    (ObjectKind::Key, 58, 32),
    (ObjectKind::Key, 68, 60),
    (ObjectKind::Key, 54, 52),
    (ObjectKind::Key, 18, 34),
    (ObjectKind::Key, 9, 44),
    (ObjectKind::Key, 18, 34),
    (ObjectKind::Key, 10, 69),
    (ObjectKind::Key, 15, 10),
    (ObjectKind::Key, 64, 13),
    (ObjectKind::Key, 40, 31),
    (ObjectKind::Boots, 64, 49),
    (ObjectKind::Boots, 40, 62),
    (ObjectKind::Boots, 39, 31),
    (ObjectKind::Chest { open: false }, 41, 15),
];

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse map text into a `cols` × `rows` grid. Returns the grid and the
/// number of cells that had to be replaced with tile 0.
pub fn parse_map(text: &str, cols: usize, rows: usize, tiles: &TileSet) -> (TileGrid, usize) {
    let mut grid = TileGrid::filled(cols, rows, TileSet::DEFAULT_INDEX);
    let mut fixed = 0;
    let mut lines = text.lines();

    for row in 0..rows {
        let Some(line) = lines.next() else {
            log::warn!("Map has {row} rows, expected {rows}; padding with tile 0");
            fixed += (rows - row) * cols;
            break;
        };

        let mut tokens = line.split_whitespace();
        for col in 0..cols {
            let Some(tok) = tokens.next() else {
                log::warn!("Map row {row} has {col} columns, expected {cols}; padding with tile 0");
                fixed += cols - col;
                break;
            };
            match tok.parse::<usize>() {
                Ok(index) if tiles.is_valid(index) => {
                    grid.set(col as i32, row as i32, index);
                }
                Ok(index) => {
                    log::warn!("Map cell ({col}, {row}): unknown tile {index}, using tile 0");
                    fixed += 1;
                }
                Err(_) => {
                    log::warn!("Map cell ({col}, {row}): bad token {tok:?}, using tile 0");
                    fixed += 1;
                }
            }
        }
        if tokens.next().is_some() {
            log::debug!("Map row {row} has extra columns; ignored");
        }
    }

    (grid, fixed)
}

pub fn load_map(path: &Path, cols: usize, rows: usize, tiles: &TileSet) -> Result<TileGrid, MapError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| MapError::Io { path: path.to_path_buf(), source })?;
    if text.trim().is_empty() {
        return Err(MapError::Empty { path: path.to_path_buf() });
    }
    let (grid, fixed) = parse_map(&text, cols, rows, tiles);
    if fixed > 0 {
        log::warn!("{}: {fixed} cells replaced with tile 0", path.display());
    }
    log::info!("Loaded map {} ({cols}x{rows})", path.display());
    Ok(grid)
}

/// Load the startup map, falling back to the generated world.
pub fn initial_grid(path: &Path, cols: usize, rows: usize, tiles: &TileSet) -> TileGrid {
    load_map(path, cols, rows, tiles).unwrap_or_else(|e| {
        log::warn!("{e}; using built-in world");
        fallback_world(cols, rows, tiles)
    })
}

/// Re-read the map file in place. On error the current grid stays.
pub fn reload_map(world: &mut WorldState) -> GameEvent {
    let (cols, rows) = (world.grid.cols(), world.grid.rows());
    match load_map(&world.map_path, cols, rows, &world.tiles) {
        Ok(grid) => {
            world.grid = grid;
            world.set_message("Map reloaded");
            GameEvent::MapReloaded
        }
        Err(e) => {
            log::warn!("Map reload failed: {e}; keeping current map");
            world.set_message("Map reload failed");
            GameEvent::MapReloadFailed
        }
    }
}

/// Island world used when no map file can be read: deep water border,
/// a sand beach, grass inside and scattered single trees. Built-in indices
/// the loaded tile set lacks become tile 0.
pub fn fallback_world(cols: usize, rows: usize, tiles: &TileSet) -> TileGrid {
    let pick = |index: usize| {
        if tiles.is_valid(index) { index } else { TileSet::DEFAULT_INDEX }
    };
    let (c, r) = (cols as i32, rows as i32);
    let mut grid = TileGrid::filled(cols, rows, pick(DEEP_WATER));
    grid.fill_rect(2, 2, c - 2, r - 2, pick(SAND));
    grid.fill_rect(3, 3, c - 3, r - 3, pick(GRASS));

    let tree = pick(TREE);
    for row in 3..r - 3 {
        for col in 3..c - 3 {
            let reserved = OBJECT_PLACEMENTS.iter().any(|&(_, oc, or)| oc == col && or == row);
            if !reserved && col % 9 == 4 && row % 7 == 3 {
                grid.set(col, row, tree);
            }
        }
    }
    if tiles.len() <= DEEP_WATER {
        log::warn!("Tile set has {} tiles; fallback world uses tile 0 for the missing ones", tiles.len());
    }
    grid
}

/// Populate the registry with the fresh-game objects. Placements outside
/// the grid are skipped.
pub fn place_objects(objects: &mut ObjectRegistry, grid: &TileGrid, tile_size: i32) {
    for &(kind, col, row) in OBJECT_PLACEMENTS {
        if !grid.contains(col, row) {
            log::warn!("{} at ({col}, {row}) is outside the map; skipped", kind.name());
            continue;
        }
        objects.push(GameObject::at_tile(kind, col, row, tile_size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tiles() -> TileSet {
        TileSet::builtin()
    }

    #[test]
    fn parses_well_formed_map() {
        let text = "1 2 3\n4 5 6\n";
        let (grid, fixed) = parse_map(text, 3, 2, &tiles());
        assert_eq!(fixed, 0);
        assert_eq!(grid.get(0, 0), Some(1));
        assert_eq!(grid.get(2, 1), Some(6));
    }

    #[test]
    fn bad_cells_become_default_tile() {
        let text = "1 x 99\n4\n";
        let (grid, fixed) = parse_map(text, 3, 3, &tiles());
        assert_eq!(grid.get(0, 0), Some(1));
        assert_eq!(grid.get(1, 0), Some(0)); // unparsable
        assert_eq!(grid.get(2, 0), Some(0)); // unknown index
        assert_eq!(grid.get(0, 1), Some(4));
        assert_eq!(grid.get(1, 1), Some(0)); // short row
        assert_eq!(grid.get(0, 2), Some(0)); // missing row
        assert_eq!(fixed, 2 + 2 + 3);
    }

    #[test]
    fn negative_token_is_rejected() {
        let (grid, fixed) = parse_map("-1 2", 2, 1, &tiles());
        assert_eq!(grid.get(0, 0), Some(0));
        assert_eq!(grid.get(1, 0), Some(2));
        assert_eq!(fixed, 1);
    }

    #[test]
    fn extra_columns_and_rows_are_ignored() {
        let (grid, fixed) = parse_map("1 1 1 1\n2 2 2 2\n3 3\n", 2, 2, &tiles());
        assert_eq!(fixed, 0);
        assert_eq!(grid.get(1, 1), Some(2));
        assert_eq!(grid.cols(), 2);
    }

    #[test]
    fn load_map_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "0 1").unwrap();
        writeln!(f, "2 3").unwrap();
        let grid = load_map(f.path(), 2, 2, &tiles()).unwrap();
        assert_eq!(grid.get(1, 1), Some(3));
    }

    #[test]
    fn missing_and_empty_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(matches!(load_map(&missing, 2, 2, &tiles()), Err(MapError::Io { .. })));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "  \n").unwrap();
        assert!(matches!(load_map(&empty, 2, 2, &tiles()), Err(MapError::Empty { .. })));
    }

    #[test]
    fn failed_reload_keeps_grid() {
        let mut world = crate::sim::world::test_world();
        world.map_path = PathBuf::from("/definitely/not/here/world.txt");
        let before = world.grid.clone();
        assert_eq!(reload_map(&mut world), GameEvent::MapReloadFailed);
        assert_eq!(world.grid, before);
    }

    #[test]
    fn reload_swaps_grid() {
        let mut world = crate::sim::world::test_world();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "1 1 1").unwrap();
        world.map_path = f.path().to_path_buf();
        assert_eq!(reload_map(&mut world), GameEvent::MapReloaded);
        assert_eq!(world.grid.get(0, 0), Some(1));
        assert_eq!(world.grid.get(3, 0), Some(0));
        assert_eq!(world.grid.cols(), 80);
    }

    #[test]
    fn fallback_world_keeps_objects_and_spawn_walkable() {
        let set = tiles();
        let grid = fallback_world(80, 80, &set);
        for &(_, col, row) in OBJECT_PLACEMENTS {
            let idx = grid.get(col, row).unwrap();
            assert!(!set.is_collidable(idx), "object tile ({col}, {row})");
        }
        assert!(!set.is_collidable(grid.get(40, 40).unwrap()));
        assert!(set.is_collidable(grid.get(0, 0).unwrap()));
    }

    #[test]
    fn fallback_world_only_stores_known_tiles() {
        let set = TileSet::from_toml_str(
            "[[tile]]\nname = \"floor\"\n\n[[tile]]\nname = \"beach\"\n",
        ).unwrap();
        let grid = fallback_world(80, 80, &set);
        for row in 0..80 {
            for col in 0..80 {
                let idx = grid.get(col, row).unwrap();
                assert!(set.is_valid(idx), "cell ({col}, {row}) holds {idx}");
            }
        }
        // Sand survives, everything past the set is tile 0.
        assert_eq!(grid.get(2, 2), Some(1));
        assert_eq!(grid.get(0, 0), Some(0));
    }

    #[test]
    fn placements_outside_grid_are_skipped() {
        let mut objects = ObjectRegistry::new();
        place_objects(&mut objects, &TileGrid::filled(20, 20, 0), 48);
        // Only the key at (15, 10) fits.
        assert_eq!(objects.len(), 1);
        let mut objects = ObjectRegistry::new();
        place_objects(&mut objects, &TileGrid::filled(80, 80, 0), 48);
        assert_eq!(objects.len(), OBJECT_PLACEMENTS.len());
    }
}
