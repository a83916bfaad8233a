/// TileGrid: fixed-size 2D array of tile-type indices.
///
/// Cells are stored row-major. Coordinates are signed so callers can ask
/// about cells off the edge of the map (probes ahead of a moving entity)
/// and get `None` instead of wrapping or panicking.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    cols: usize,
    rows: usize,
    cells: Vec<usize>,
}

impl TileGrid {
    /// Grid with every cell set to `index`.
    pub fn filled(cols: usize, rows: usize, index: usize) -> Self {
        TileGrid { cols, rows, cells: vec![index; cols * rows] }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows
    }

    /// Tile index at (col, row), or `None` outside the grid.
    #[inline]
    pub fn get(&self, col: i32, row: i32) -> Option<usize> {
        if self.contains(col, row) {
            Some(self.cells[row as usize * self.cols + col as usize])
        } else {
            None
        }
    }

    /// Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, col: i32, row: i32, index: usize) {
        if self.contains(col, row) {
            self.cells[row as usize * self.cols + col as usize] = index;
        }
    }

    /// Fill the rectangle of cells [col0, col1) × [row0, row1), clipped to the grid.
    pub fn fill_rect(&mut self, col0: i32, row0: i32, col1: i32, row1: i32, index: usize) {
        for row in row0..row1 {
            for col in col0..col1 {
                self.set(col, row, index);
            }
        }
    }
}
