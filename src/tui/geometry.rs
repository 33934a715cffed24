/// A point in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// An axis-aligned box in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PxRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl PxRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        PxRect { x, y, w, h }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.y && y < self.bottom()
    }
}

/// Conversion between terminal cells and logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub cell_w: f32,
    pub cell_h: f32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        CellMetrics {
            cell_w: 8.0,
            cell_h: 16.0,
        }
    }
}

impl CellMetrics {
    /// Non-positive sizes fall back to the defaults
    pub fn new(cell_w: f32, cell_h: f32) -> Self {
        let d = CellMetrics::default();
        CellMetrics {
            cell_w: if cell_w > 0.0 { cell_w } else { d.cell_w },
            cell_h: if cell_h > 0.0 { cell_h } else { d.cell_h },
        }
    }

    /// Centre of the cell at (`col`, `row`), relative to an origin cell.
    /// Cells above or left of the origin give negative coordinates.
    pub fn cell_center(&self, col: u16, row: u16, origin_col: u16, origin_row: u16) -> Point {
        let c = f32::from(col) - f32::from(origin_col);
        let r = f32::from(row) - f32::from(origin_row);
        Point {
            x: (c + 0.5) * self.cell_w,
            y: (r + 0.5) * self.cell_h,
        }
    }

    /// Nearest whole column count for a horizontal pixel distance
    pub fn cols(&self, px: f32) -> i32 {
        (px / self.cell_w).round() as i32
    }

    /// Terminal row holding a vertical pixel coordinate
    pub fn row_of(&self, px: f32) -> i32 {
        (px / self.cell_h).floor() as i32
    }

    pub fn rows_px(&self, rows: usize) -> f32 {
        rows as f32 * self.cell_h
    }
}
