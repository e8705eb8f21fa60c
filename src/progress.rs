// Reveal progress: how much of the cover has been scratched away.
//
// A full scan is O(canvas area), so it only runs on every stroke release and
// on every Nth move while a stroke is active.

use crate::surface::ScratchSurface;
use tracing::{debug, info, warn};

/// Alpha below this counts as cleared (0..=255).
pub const CLEARED_ALPHA: u8 = 32;
/// Fraction of cleared pixels that completes the reveal.
pub const CLEAR_THRESHOLD: f64 = 0.65;
/// Sample on every Nth move event of an active stroke.
pub const SAMPLE_EVERY_MOVES: u32 = 8;

/// Derived measurement of reveal completion.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProgressState {
    pub cleared_ratio: f64,
    pub done: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleOutcome {
    /// Below the threshold; holds the cleared ratio.
    Measured(f64),
    /// This sample crossed the threshold. Reported once per canvas.
    Completed(f64),
    /// Completion already happened; nothing was scanned.
    AlreadyDone,
    /// The bitmap could not be read this round.
    Unavailable,
}

pub type CompletionCallback = Box<dyn FnOnce()>;

pub struct ProgressSampler {
    alpha_cutoff: u8,
    threshold: f64,
    sample_every: u32,
    moves: u32,
    state: ProgressState,
    unavailable_streak: u32,
    on_complete: Option<CompletionCallback>,
}

impl ProgressSampler {
    pub fn new(on_complete: CompletionCallback) -> Self {
        Self::with_tuning(CLEARED_ALPHA, CLEAR_THRESHOLD, SAMPLE_EVERY_MOVES, on_complete)
    }

    pub fn with_tuning(
        alpha_cutoff: u8,
        threshold: f64,
        sample_every: u32,
        on_complete: CompletionCallback,
    ) -> Self {
        Self {
            alpha_cutoff,
            threshold: threshold.clamp(0.0, 1.0),
            sample_every: sample_every.max(1),
            moves: 0,
            state: ProgressState::default(),
            unavailable_streak: 0,
            on_complete: Some(on_complete),
        }
    }

    /// Count one move of an active stroke; samples on every Nth.
    pub fn on_move(&mut self, surface: &mut ScratchSurface) -> Option<SampleOutcome> {
        self.moves = self.moves.wrapping_add(1);
        if self.moves % self.sample_every == 0 {
            Some(self.sample(surface))
        } else {
            None
        }
    }

    /// A stroke ended: always sample.
    pub fn on_release(&mut self, surface: &mut ScratchSurface) -> SampleOutcome {
        self.sample(surface)
    }

    /// Scan the alpha channel and update the state. On the sample that
    /// crosses the threshold the surface is cleared and the callback fires.
    pub fn sample(&mut self, surface: &mut ScratchSurface) -> SampleOutcome {
        if self.state.done {
            return SampleOutcome::AlreadyDone;
        }

        let alpha = match surface.read_alpha() {
            Ok(alpha) => alpha,
            Err(e) => {
                if self.unavailable_streak == 0 {
                    warn!("reveal progress cannot be measured, completion is blocked: {e}");
                }
                self.unavailable_streak = self.unavailable_streak.saturating_add(1);
                return SampleOutcome::Unavailable;
            }
        };
        self.unavailable_streak = 0;

        if alpha.is_empty() {
            return SampleOutcome::Unavailable;
        }

        let cleared = alpha.iter().filter(|&&a| a < self.alpha_cutoff).count();
        let ratio = (cleared as f64 / alpha.len() as f64).clamp(0.0, 1.0);
        // Erasing only ever lowers alpha, so this is already non-decreasing.
        self.state.cleared_ratio = self.state.cleared_ratio.max(ratio);
        debug!(cleared, total = alpha.len(), ratio, "progress sample");

        if self.state.cleared_ratio < self.threshold {
            return SampleOutcome::Measured(self.state.cleared_ratio);
        }

        self.state.done = true;
        surface.clear();
        info!(ratio = self.state.cleared_ratio, "scratch card revealed");
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
        SampleOutcome::Completed(self.state.cleared_ratio)
    }

    /// Start over on a fresh canvas. A finished reveal stays finished.
    pub fn reset(&mut self) {
        if self.state.done {
            return;
        }
        self.state = ProgressState::default();
        self.moves = 0;
        self.unavailable_streak = 0;
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.done
    }

    /// True while the latest sample attempts all failed to read the bitmap.
    pub fn is_unmeasurable(&self) -> bool {
        self.unavailable_streak > 0
    }
}
