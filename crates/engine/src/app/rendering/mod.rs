mod renderer;
mod transform;

pub use renderer::{FrameRenderer, PixelsRenderer, RenderError};
pub use transform::{surface_viewport, tile_origin_px, SceneView, Viewport};

pub const TILE_FILL_COLOR: [u8; 4] = [0xf5, 0xe1, 0xe2, 0xff];
pub const TILE_OUTLINE_COLOR: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
pub const MARKER_COLOR: [u8; 4] = [0xbd, 0x14, 0x34, 0xff];
