// Core pixel types shared by the surface, the compositor and the window.

/// A packed pixel buffer. Each entry is 0xAARRGGBB.
/// minifb ignores the top byte, so a composited frame can be presented as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // length = width * height
}

impl FrameBuffer {
    /// A buffer filled with one colour.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    /// A fully transparent buffer.
    pub fn transparent(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// A canvas-local or viewport position in layout pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[inline]
pub fn alpha_of(px: u32) -> u8 {
    (px >> 24) as u8
}

#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_argb(px: u32) -> (u8, u8, u8, u8) {
    ((px >> 24) as u8, (px >> 16) as u8, (px >> 8) as u8, px as u8)
}
