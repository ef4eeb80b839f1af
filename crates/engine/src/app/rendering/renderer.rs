use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture, TextureError};
use thiserror::Error;
use winit::window::Window;

use super::{
    tile_origin_px, SceneView, Viewport, MARKER_COLOR, TILE_FILL_COLOR, TILE_OUTLINE_COLOR,
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rendering surface unavailable: {0}")]
    SurfaceUnavailable(#[source] pixels::Error),
    #[error("failed to resize rendering surface: {0}")]
    ResizeSurface(#[source] TextureError),
    #[error("frame buffer holds {actual_len} bytes but the scene needs {expected_len}")]
    FrameSizeMismatch {
        expected_len: usize,
        actual_len: usize,
    },
}

/// Consumer of one read-only scene snapshot per frame.
pub trait FrameRenderer {
    fn draw(&mut self, view: &SceneView) -> Result<(), RenderError>;
}

/// Draws the grid into a `pixels` buffer sized to the whole map; the surface
/// scales it to the window.
pub struct PixelsRenderer {
    pixels: Pixels<'static>,
    buffer: Viewport,
}

impl PixelsRenderer {
    pub fn new(window: Arc<Window>, buffer: Viewport) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(buffer.width, buffer.height, surface)
            .map_err(RenderError::SurfaceUnavailable)?;
        Ok(Self { pixels, buffer })
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels
            .resize_surface(width, height)
            .map_err(RenderError::ResizeSurface)
    }

    pub fn buffer_size(&self) -> Viewport {
        self.buffer
    }
}

impl FrameRenderer for PixelsRenderer {
    fn draw(&mut self, view: &SceneView) -> Result<(), RenderError> {
        paint_scene(self.pixels.frame_mut(), view)?;
        self.pixels.render().map_err(RenderError::SurfaceUnavailable)
    }
}

/// Full redraw, back to front: every tile (fill, then outline), then the
/// marker tile on top.
pub(crate) fn paint_scene(frame: &mut [u8], view: &SceneView) -> Result<(), RenderError> {
    let viewport = view.viewport().unwrap_or(Viewport {
        width: 0,
        height: 0,
    });
    let expected_len = viewport.width as usize * viewport.height as usize * 4;
    if viewport.width == 0 || frame.len() != expected_len {
        return Err(RenderError::FrameSizeMismatch {
            expected_len,
            actual_len: frame.len(),
        });
    }

    let width = viewport.width;
    let tile = view.tile_size;
    for row in 0..view.grid.rows() {
        for col in 0..view.grid.columns() {
            let (x, y) = tile_origin_px(col, row, tile);
            fill_rect(frame, width, viewport.height, x, y, tile, TILE_FILL_COLOR);
            outline_rect(frame, width, x, y, tile, TILE_OUTLINE_COLOR);
        }
    }

    if view.grid.contains(view.position) {
        let (x, y) = tile_origin_px(view.position.col, view.position.row, tile);
        fill_rect(frame, width, viewport.height, x, y, tile, MARKER_COLOR);
    }
    Ok(())
}

fn fill_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    size: u32,
    color: [u8; 4],
) {
    let size = size as i32;
    let top = y.max(0);
    let bottom = y.saturating_add(size).min(height as i32);
    let left = x.max(0);
    let right = x.saturating_add(size).min(width as i32);
    for py in top..bottom {
        for px in left..right {
            write_pixel_rgba_clipped(frame, width as usize, px, py, color);
        }
    }
}

fn outline_rect(frame: &mut [u8], width: u32, x: i32, y: i32, size: u32, color: [u8; 4]) {
    if size == 0 {
        return;
    }
    let left = x;
    let right = x.saturating_add(size as i32 - 1);
    let top = y;
    let bottom = y.saturating_add(size as i32 - 1);

    for px in left..=right {
        write_pixel_rgba_clipped(frame, width as usize, px, top, color);
        write_pixel_rgba_clipped(frame, width as usize, px, bottom, color);
    }
    for py in top..=bottom {
        write_pixel_rgba_clipped(frame, width as usize, left, py, color);
        write_pixel_rgba_clipped(frame, width as usize, right, py, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
