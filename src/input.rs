// Pointer + touch input, folded into one stroke stream in canvas coordinates.
//
// Idle --press--> Stroking --release--> Idle
//
// While Stroking every event asks the host to suppress its default gesture
// handling (page scroll, text selection).

use crate::types::Point;

/// Raw UI events as the host delivers them, in viewport coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    /// Active contacts, primary first.
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    TouchEnd,
}

/// The canvas bounding rectangle in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
}

impl CanvasRect {
    pub fn to_local(&self, viewport: Point) -> Point {
        Point::new(viewport.x - self.left, viewport.y - self.top)
    }
}

/// What the surface should do with a normalized event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeAction {
    Begin(Point),
    Extend(Point),
    End,
}

/// A normalized event plus whether the host should cancel its default gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalized {
    pub action: StrokeAction,
    pub prevent_default: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum StrokeState {
    #[default]
    Idle,
    Stroking,
}

#[derive(Debug, Default)]
pub struct InputNormalizer {
    state: StrokeState,
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stroking(&self) -> bool {
        self.state == StrokeState::Stroking
    }

    /// Feed one raw event. Returns `None` for events that do not touch the
    /// stroke (moves while idle, releases while idle, touches with no contact).
    pub fn normalize(&mut self, event: &InputEvent, rect: CanvasRect) -> Option<Normalized> {
        match event {
            InputEvent::PointerDown(p) => Some(self.begin(rect.to_local(*p))),
            InputEvent::TouchStart(touches) => {
                let primary = touches.first()?;
                Some(self.begin(rect.to_local(*primary)))
            }
            InputEvent::PointerMove(p) => self.extend(rect.to_local(*p)),
            InputEvent::TouchMove(touches) => {
                let primary = touches.first()?;
                self.extend(rect.to_local(*primary))
            }
            // Releases are global: they end the stroke wherever they land.
            InputEvent::PointerUp | InputEvent::TouchEnd => self.end(),
        }
    }

    fn begin(&mut self, local: Point) -> Normalized {
        self.state = StrokeState::Stroking;
        Normalized { action: StrokeAction::Begin(local), prevent_default: true }
    }

    fn extend(&mut self, local: Point) -> Option<Normalized> {
        if self.state != StrokeState::Stroking {
            return None;
        }
        Some(Normalized { action: StrokeAction::Extend(local), prevent_default: true })
    }

    fn end(&mut self) -> Option<Normalized> {
        if self.state != StrokeState::Stroking {
            return None;
        }
        self.state = StrokeState::Idle;
        Some(Normalized { action: StrokeAction::End, prevent_default: false })
    }

    /// Drop any stroke in flight (used when the canvas is rebuilt).
    pub fn reset(&mut self) {
        self.state = StrokeState::Idle;
    }
}
