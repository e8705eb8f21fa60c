// The scratch card: layout + surface + input + progress wired together.
//
// Initial --mount--> Ready --threshold--> Revealed (terminal)
//
// A resize in Ready rebuilds the canvas and throws progress away. A resize in
// Revealed only resizes the (empty) canvas.

use crate::assets::LoadedImages;
use crate::error::Error;
use crate::input::{CanvasRect, InputEvent, InputNormalizer, Normalized, StrokeAction};
use crate::layout::{LayoutEngine, Size};
use crate::progress::{
    CompletionCallback, ProgressSampler, ProgressState, SampleOutcome, CLEARED_ALPHA,
    CLEAR_THRESHOLD, SAMPLE_EVERY_MOVES,
};
use crate::surface::{scale_to_frame, PixelReadPolicy, ScratchSurface};
use crate::types::FrameBuffer;
use image::RgbaImage;
use tracing::{debug, info};

pub const BRUSH_RADIUS: f32 = 40.0;

/// Engine tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScratchConfig {
    pub brush_radius: f32,
    pub clear_threshold: f64,
    pub cleared_alpha: u8,
    pub sample_every_moves: u32,
    pub pixel_reads: PixelReadPolicy,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            brush_radius: BRUSH_RADIUS,
            clear_threshold: CLEAR_THRESHOLD,
            cleared_alpha: CLEARED_ALPHA,
            sample_every_moves: SAMPLE_EVERY_MOVES,
            pixel_reads: PixelReadPolicy::Allowed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardState {
    Initial,
    Ready,
    Revealed,
}

/// Everything that exists once both images are loaded.
struct Mounted {
    cover: RgbaImage,
    reveal: RgbaImage,
    layout: LayoutEngine,
    surface: ScratchSurface,
    reveal_layer: FrameBuffer,
}

pub struct ScratchCard {
    config: ScratchConfig,
    state: CardState,
    input: InputNormalizer,
    sampler: ProgressSampler,
    mounted: Option<Mounted>,
}

impl ScratchCard {
    pub fn new(config: ScratchConfig, on_complete: CompletionCallback) -> Self {
        let sampler = ProgressSampler::with_tuning(
            config.cleared_alpha,
            config.clear_threshold,
            config.sample_every_moves,
            on_complete,
        );
        Self { config, state: CardState::Initial, input: InputNormalizer::new(), sampler, mounted: None }
    }

    /// Both images are ready: size the canvas and paint the cover.
    pub fn mount(&mut self, images: LoadedImages, container_width: usize) -> Result<(), Error> {
        let LoadedImages { cover, reveal } = images;
        let natural = Size::new(reveal.width() as usize, reveal.height() as usize);
        let layout = LayoutEngine::new(natural, container_width)?;
        let size = layout.draw_size();
        let surface = ScratchSurface::with_cover(&cover, size, self.config.pixel_reads);
        let reveal_layer = scale_to_frame(&reveal, size);
        self.mounted = Some(Mounted { cover, reveal, layout, surface, reveal_layer });
        self.state = CardState::Ready;
        info!(width = size.width, height = size.height, "scratch card ready");
        Ok(())
    }

    /// A viewport resize happened. The canvas is always rebuilt, so in Ready
    /// every resize wipes the scratch progress, even when the size is the same.
    /// Repeated calls with the same width converge on the same state.
    pub fn resize(&mut self, container_width: usize) -> Result<(), Error> {
        let Some(m) = self.mounted.as_mut() else {
            return Ok(());
        };
        let (size, _) = m.layout.relayout(container_width)?;
        m.reveal_layer = scale_to_frame(&m.reveal, size);
        match self.state {
            CardState::Revealed => {
                m.surface = ScratchSurface::new(size, self.config.pixel_reads);
                debug!(width = size.width, height = size.height, "revealed card resized");
            }
            _ => {
                m.surface = ScratchSurface::with_cover(&m.cover, size, self.config.pixel_reads);
                self.input.reset();
                self.sampler.reset();
                info!(width = size.width, height = size.height, "canvas rebuilt, scratch progress reset");
            }
        }
        Ok(())
    }

    /// Route one raw UI event. Returns the normalized action when the card
    /// consumed it (so the host knows whether to suppress default gestures).
    pub fn handle_input(&mut self, event: &InputEvent, rect: CanvasRect) -> Option<Normalized> {
        if self.state != CardState::Ready {
            return None;
        }
        let m = self.mounted.as_mut()?;
        let normalized = self.input.normalize(event, rect)?;

        let outcome = match normalized.action {
            StrokeAction::Begin(p) => {
                m.surface.erase_disc(p, self.config.brush_radius);
                None
            }
            StrokeAction::Extend(p) => {
                m.surface.erase_disc(p, self.config.brush_radius);
                self.sampler.on_move(&mut m.surface)
            }
            StrokeAction::End => Some(self.sampler.on_release(&mut m.surface)),
        };

        if let Some(SampleOutcome::Completed(_)) = outcome {
            self.state = CardState::Revealed;
            self.input.reset();
        }
        Some(normalized)
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn progress(&self) -> ProgressState {
        self.sampler.state()
    }

    pub fn is_unmeasurable(&self) -> bool {
        self.sampler.is_unmeasurable()
    }

    pub fn draw_size(&self) -> Option<Size> {
        self.mounted.as_ref().map(|m| m.layout.draw_size())
    }

    /// The reveal image scaled to the current draw size.
    pub fn reveal_layer(&self) -> Option<&FrameBuffer> {
        self.mounted.as_ref().map(|m| &m.reveal_layer)
    }

    /// The erasable cover bitmap.
    pub fn cover_layer(&self) -> Option<&FrameBuffer> {
        self.mounted.as_ref().map(|m| m.surface.bitmap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{alpha_of, Point};
    use image::Rgba;

    fn images(w: u32, h: u32) -> LoadedImages {
        LoadedImages {
            cover: RgbaImage::from_pixel(w, h, Rgba([120, 120, 120, 255])),
            reveal: RgbaImage::from_pixel(w, h, Rgba([0, 200, 0, 255])),
        }
    }

    #[test]
    fn input_before_mount_is_ignored() {
        let mut card = ScratchCard::new(ScratchConfig::default(), Box::new(|| {}));
        assert_eq!(card.state(), CardState::Initial);
        let ev = InputEvent::PointerDown(Point::new(1.0, 1.0));
        assert!(card.handle_input(&ev, CanvasRect::default()).is_none());
        assert!(card.resize(100).is_ok());
    }

    #[test]
    fn mount_sizes_canvas_to_container() {
        let mut card = ScratchCard::new(ScratchConfig::default(), Box::new(|| {}));
        card.mount(images(400, 200), 100).unwrap();
        assert_eq!(card.state(), CardState::Ready);
        assert_eq!(card.draw_size(), Some(Size::new(100, 50)));
        assert!(card.cover_layer().unwrap().pixels.iter().all(|&p| alpha_of(p) == 255));
    }
}
