//! Battle-grid addressing for field entities.
//!
//! Maps a discrete (column, row) cell to a continuous pixel offset with a
//! fixed-perspective projection: rows nearer the camera are taller and
//! their columns wider. Row 0 is the vertical center; positive rows are
//! nearer the camera, positive columns to the right. Pure math, no side
//! effects — used only to place anchored children at named cells.

use glam::Vec2;

/// Rows extend from -ROW_SPAN (back) to +ROW_SPAN (front).
pub const ROW_SPAN: i32 = 2;

/// Row heights from the back row to the front row, in pixels.
const ROW_HEIGHT: [f32; 5] = [30.0, 36.0, 44.0, 54.0, 66.0];

/// Column widths per row, back to front.
const COL_WIDTH: [f32; 5] = [64.0, 72.0, 82.0, 94.0, 108.0];

fn row_index(row: i32) -> usize {
    (row.clamp(-ROW_SPAN, ROW_SPAN) + ROW_SPAN) as usize
}

/// Pixel offset of a grid cell relative to the grid's center cell (0, 0).
/// Rows outside the grid clamp to the nearest edge row.
pub fn grid_offset(col: i32, row: i32) -> Vec2 {
    let row = row.clamp(-ROW_SPAN, ROW_SPAN);
    let x = col as f32 * COL_WIDTH[row_index(row)];

    // Stepping one row toward the camera advances by the average of the two
    // rows' heights, so adjacent rows share an edge under the projection.
    let mut y = 0.0;
    if row > 0 {
        for r in 0..row {
            y += (ROW_HEIGHT[row_index(r)] + ROW_HEIGHT[row_index(r + 1)]) * 0.5;
        }
    } else {
        for r in row..0 {
            y -= (ROW_HEIGHT[row_index(r)] + ROW_HEIGHT[row_index(r + 1)]) * 0.5;
        }
    }

    Vec2::new(x, y)
}
