use crate::app::{GridSize, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Everything the renderer is allowed to see of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneView {
    pub grid: GridSize,
    pub tile_size: u32,
    pub position: Position,
}

impl SceneView {
    pub fn viewport(&self) -> Option<Viewport> {
        surface_viewport(self.grid, self.tile_size)
    }
}

/// Pixel size of a `grid` drawn with square tiles of `tile_size`.
/// `None` when the tile size is zero or the surface overflows `u32`.
pub fn surface_viewport(grid: GridSize, tile_size: u32) -> Option<Viewport> {
    if tile_size == 0 {
        return None;
    }
    Some(Viewport {
        width: grid.columns().checked_mul(tile_size)?,
        height: grid.rows().checked_mul(tile_size)?,
    })
}

/// Top-left pixel of the tile at `(col, row)`.
pub fn tile_origin_px(col: u32, row: u32, tile_size: u32) -> (i32, i32) {
    let x = i64::from(col) * i64::from(tile_size);
    let y = i64::from(row) * i64::from(tile_size);
    (clamp_to_i32(x), clamp_to_i32(y))
}

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
