// Responsive sizing for the scratch card.
// Visual: the card never grows past its natural size, and shrinks to fit a
// narrower container while keeping its aspect ratio.

use crate::error::Error;

/// Width/height in whole layout pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// `scale = min(1, container / natural)`, then floor both axes.
pub fn fit_to_container(natural: Size, container_width: usize) -> Result<Size, Error> {
    if natural.width == 0 || natural.height == 0 {
        return Err(Error::EmptyImage(format!(
            "natural size {}x{}",
            natural.width, natural.height
        )));
    }
    if container_width >= natural.width {
        return Ok(natural);
    }
    // Exact floor(n * container / natural) in integers; floats drift at the edges.
    let scaled = |n: usize| (n as u128 * container_width as u128 / natural.width as u128) as usize;
    Ok(Size { width: scaled(natural.width), height: scaled(natural.height) })
}

/// Remembers the reveal image's natural size and the last container width.
/// Re-running `relayout` with the same width always lands on the same size.
#[derive(Clone, Debug)]
pub struct LayoutEngine {
    natural: Size,
    container_width: usize,
    current: Size,
}

impl LayoutEngine {
    pub fn new(natural: Size, container_width: usize) -> Result<Self, Error> {
        let current = fit_to_container(natural, container_width)?;
        Ok(Self { natural, container_width, current })
    }

    /// Recompute for a new container width. Returns the new draw size and
    /// whether it differs from the previous one.
    pub fn relayout(&mut self, container_width: usize) -> Result<(Size, bool), Error> {
        let next = fit_to_container(self.natural, container_width)?;
        let changed = next != self.current;
        self.container_width = container_width;
        self.current = next;
        Ok((next, changed))
    }

    pub fn container_width(&self) -> usize {
        self.container_width
    }

    pub fn draw_size(&self) -> Size {
        self.current
    }
}
