/// Viewport: world ↔ screen mapping around a focal point, plus culling.
///
/// The focal entity sits at a fixed screen position (the view centre less
/// half a tile). There is no camera clamp: near the world edge the view
/// simply shows nothing past the map.

/// True when a tile-sized thing at (tx, ty) overlaps the view around (fx, fy).
pub fn is_visible(tx: i32, ty: i32, fx: i32, fy: i32, hw: i32, hh: i32, tile: i32) -> bool {
    tx + tile > fx - hw
        && tx - tile < fx + hw
        && ty + tile > fy - hh
        && ty - tile < fy + hh
}

pub fn to_screen(world: i32, focal_world: i32, focal_screen: i32) -> i32 {
    world - focal_world + focal_screen
}

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    /// View size in world pixels.
    pub width: i32,
    pub height: i32,
    pub tile_size: i32,
}

impl Viewport {
    pub fn new(cols: i32, rows: i32, tile_size: i32) -> Self {
        Viewport { width: cols * tile_size, height: rows * tile_size, tile_size }
    }

    /// Screen position of the focal entity; doubles as the half-view extents.
    pub fn focal_screen(&self) -> (i32, i32) {
        (self.width / 2 - self.tile_size / 2, self.height / 2 - self.tile_size / 2)
    }

    pub fn visible(&self, tx: i32, ty: i32, focal: (i32, i32)) -> bool {
        let (hw, hh) = self.focal_screen();
        is_visible(tx, ty, focal.0, focal.1, hw, hh, self.tile_size)
    }

    pub fn project(&self, wx: i32, wy: i32, focal: (i32, i32)) -> (i32, i32) {
        let (sx, sy) = self.focal_screen();
        (to_screen(wx, focal.0, sx), to_screen(wy, focal.1, sy))
    }

    /// Grid cells worth drawing for this focal point, clipped to the grid.
    pub fn visible_cells(&self, focal: (i32, i32), cols: i32, rows: i32) -> Vec<(i32, i32)> {
        let t = self.tile_size;
        let (hw, hh) = self.focal_screen();
        let col0 = ((focal.0 - hw).div_euclid(t) - 1).max(0);
        let col1 = ((focal.0 + hw).div_euclid(t) + 1).min(cols - 1);
        let row0 = ((focal.1 - hh).div_euclid(t) - 1).max(0);
        let row1 = ((focal.1 + hh).div_euclid(t) + 1).min(rows - 1);

        let mut out = Vec::new();
        for row in row0..=row1 {
            for col in col0..=col1 {
                if self.visible(col * t, row * t, focal) {
                    out.push((col, row));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i32 = 48;

    #[test]
    fn focal_is_centred() {
        let vp = Viewport::new(16, 12, T);
        assert_eq!(vp.focal_screen(), (360, 264));
        assert_eq!(vp.project(1000, 2000, (1000, 2000)), (360, 264));
        assert_eq!(vp.project(1048, 1952, (1000, 2000)), (408, 216));
    }

    #[test]
    fn visibility_margin_is_one_tile() {
        let (fx, fy, hw, hh) = (1000, 1000, 360, 264);
        assert!(is_visible(fx, fy, fx, fy, hw, hh, T));
        // Just inside the left margin.
        assert!(is_visible(fx - hw - T + 1, fy, fx, fy, hw, hh, T));
        // Exactly on it is culled.
        assert!(!is_visible(fx - hw - T, fy, fx, fy, hw, hh, T));
        assert!(!is_visible(fx + hw + T, fy, fx, fy, hw, hh, T));
        assert!(!is_visible(fx, fy + hh + T, fx, fy, hw, hh, T));
    }

    #[test]
    fn visible_cells_are_clipped_to_grid() {
        let vp = Viewport::new(16, 12, T);
        let cells = vp.visible_cells((0, 0), 80, 80);
        assert!(!cells.is_empty());
        assert!(cells.iter().all(|&(c, r)| c >= 0 && r >= 0));
        assert!(cells.contains(&(0, 0)));
        assert!(!cells.contains(&(20, 0)));
    }

    #[test]
    fn visible_cells_match_predicate() {
        let vp = Viewport::new(16, 12, T);
        let focal = (40 * T + 7, 40 * T + 13);
        for (c, r) in vp.visible_cells(focal, 80, 80) {
            assert!(vp.visible(c * T, r * T, focal));
        }
    }
}
