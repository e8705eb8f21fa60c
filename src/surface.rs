// The erasable cover bitmap.
// Visual: starts as the cover art at full opacity; every dab cuts a round
// hole (colour *and* alpha removed) so the reveal image shows through.

use crate::error::Error;
use crate::layout::Size;
use crate::types::{alpha_of, pack_argb, unpack_argb, FrameBuffer, Point};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Whether the bitmap may be read back for progress sampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelReadPolicy {
    #[default]
    Allowed,
    /// Reads are refused (think: a tainted, cross-origin canvas). Erasing
    /// still works, sampling never measures anything.
    Restricted,
}

pub struct ScratchSurface {
    bitmap: FrameBuffer,
    policy: PixelReadPolicy,
}

impl ScratchSurface {
    /// A fully transparent surface of the given size.
    pub fn new(size: Size, policy: PixelReadPolicy) -> Self {
        Self { bitmap: FrameBuffer::transparent(size.width, size.height), policy }
    }

    /// A surface with `cover` scaled onto it.
    pub fn with_cover(cover: &RgbaImage, size: Size, policy: PixelReadPolicy) -> Self {
        let mut surface = Self::new(size, policy);
        surface.paint_cover(cover);
        surface
    }

    /// Wipe the bitmap and draw `cover` stretched to the full surface.
    /// Visual: the scratch layer looks brand new again.
    pub fn paint_cover(&mut self, cover: &RgbaImage) {
        let (w, h) = (self.bitmap.width, self.bitmap.height);
        self.clear();
        if w == 0 || h == 0 || cover.width() == 0 || cover.height() == 0 {
            return;
        }
        // An opaque cover stays opaque; resampling must not leave 254s behind.
        let opaque = cover.pixels().all(|px| px.0[3] == 255);
        let scaled = imageops::resize(cover, w as u32, h as u32, FilterType::Triangle);
        for (dst, px) in self.bitmap.pixels.iter_mut().zip(scaled.pixels()) {
            let [r, g, b, a] = px.0;
            *dst = pack_argb(if opaque { 255 } else { a }, r, g, b);
        }
    }

    /// Remove every pixel whose centre lies inside the disc.
    /// Only the disc's bounding box is scanned.
    pub fn erase_disc(&mut self, center: Point, radius: f32) {
        if radius <= 0.0 || self.bitmap.is_empty() {
            return;
        }
        let w = self.bitmap.width as i64;
        let h = self.bitmap.height as i64;
        let r2 = radius * radius;

        let x0 = ((center.x - radius).floor() as i64).max(0);
        let x1 = ((center.x + radius).ceil() as i64).min(w - 1);
        let y0 = ((center.y - radius).floor() as i64).max(0);
        let y1 = ((center.y + radius).ceil() as i64).min(h - 1);

        for y in y0..=y1 {
            let dy = y as f32 + 0.5 - center.y;
            let row = y as usize * self.bitmap.width;
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    self.bitmap.pixels[row + x as usize] = 0;
                }
            }
        }
    }

    /// Make the whole surface fully transparent.
    pub fn clear(&mut self) {
        self.bitmap.pixels.fill(0);
    }

    /// Alpha channel, one byte per pixel, row-major.
    pub fn read_alpha(&self) -> Result<Vec<u8>, Error> {
        match self.policy {
            PixelReadPolicy::Allowed => Ok(self.bitmap.pixels.iter().map(|&p| alpha_of(p)).collect()),
            PixelReadPolicy::Restricted => Err(Error::PixelRead(format!(
                "{}x{} surface is read-restricted",
                self.bitmap.width, self.bitmap.height
            ))),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.bitmap.width, self.bitmap.height)
    }

    /// Read-only view for compositing.
    pub fn bitmap(&self) -> &FrameBuffer {
        &self.bitmap
    }
}

/// Source-over composite of `top` onto an opaque `bottom` of the same size.
/// Visual: where the cover is erased you see the reveal layer.
pub fn composite_over(top: &FrameBuffer, bottom: &FrameBuffer) -> FrameBuffer {
    let mut out = bottom.clone();
    if top.width != bottom.width || top.height != bottom.height {
        return out;
    }
    for (dst, &src) in out.pixels.iter_mut().zip(top.pixels.iter()) {
        let (a, sr, sg, sb) = unpack_argb(src);
        if a == 0 {
            continue;
        }
        if a == 255 {
            *dst = src;
            continue;
        }
        let (_, dr, dg, db) = unpack_argb(*dst);
        let a = a as u32;
        let inv = 255 - a;
        let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
        *dst = pack_argb(255, mix(sr, dr), mix(sg, dg), mix(sb, db));
    }
    out
}

/// Scale an image into an opaque frame (the reveal layer under the cover).
pub fn scale_to_frame(img: &RgbaImage, size: Size) -> FrameBuffer {
    if size.width == 0 || size.height == 0 || img.width() == 0 || img.height() == 0 {
        return FrameBuffer::transparent(size.width, size.height);
    }
    let scaled = imageops::resize(img, size.width as u32, size.height as u32, FilterType::Triangle);
    let pixels = scaled.pixels().map(|px| {
        let [r, g, b, _] = px.0;
        pack_argb(255, r, g, b)
    });
    FrameBuffer { width: size.width, height: size.height, pixels: pixels.collect() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn opaque_cover() -> RgbaImage {
        RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 255]))
    }

    #[test]
    fn cover_paints_fully_opaque() {
        let surface = ScratchSurface::with_cover(&opaque_cover(), Size::new(40, 30), PixelReadPolicy::Allowed);
        let alpha = surface.read_alpha().unwrap();
        assert_eq!(alpha.len(), 1200);
        assert!(alpha.iter().all(|&a| a == 255));
    }

    #[test]
    fn erase_removes_colour_and_alpha_inside_the_disc_only() {
        let mut surface = ScratchSurface::with_cover(&opaque_cover(), Size::new(100, 100), PixelReadPolicy::Allowed);
        surface.erase_disc(Point::new(50.0, 50.0), 10.0);
        let px = surface.bitmap().pixels[50 * 100 + 50];
        assert_eq!(px, 0);
        assert_eq!(alpha_of(surface.bitmap().pixels[0]), 255);
        assert_eq!(alpha_of(surface.bitmap().pixels[50 * 100 + 61]), 255);
    }

    #[test]
    fn erase_near_the_edge_is_clipped() {
        let mut surface = ScratchSurface::with_cover(&opaque_cover(), Size::new(20, 20), PixelReadPolicy::Allowed);
        surface.erase_disc(Point::new(-5.0, -5.0), 10.0);
        surface.erase_disc(Point::new(500.0, 500.0), 10.0);
        assert_eq!(surface.bitmap().pixels[0], 0);
        assert_eq!(alpha_of(surface.bitmap().pixels[19 * 20 + 19]), 255);
    }

    #[test]
    fn restricted_surface_refuses_reads_but_still_erases() {
        let mut surface = ScratchSurface::with_cover(&opaque_cover(), Size::new(10, 10), PixelReadPolicy::Restricted);
        surface.erase_disc(Point::new(5.0, 5.0), 3.0);
        assert_eq!(surface.bitmap().pixels[5 * 10 + 5], 0);
        assert!(matches!(surface.read_alpha(), Err(Error::PixelRead(_))));
    }

    #[test]
    fn composite_shows_bottom_through_holes() {
        let top = FrameBuffer { width: 2, height: 1, pixels: vec![pack_argb(255, 1, 2, 3), 0] };
        let bottom = FrameBuffer::filled(2, 1, pack_argb(255, 9, 9, 9));
        let out = composite_over(&top, &bottom);
        assert_eq!(out.pixels, vec![pack_argb(255, 1, 2, 3), pack_argb(255, 9, 9, 9)]);
    }
}
