//! Input abstraction layer.
//!
//! Normalizes mouse and touch events into a unified `InputEvent` enum
//! consumed by the interaction controller. Touch gestures use the first
//! active touch point as the pointer; the mouse events a browser emulates
//! for the same touch are dropped by [`EmulatedMouseFilter`].

use thumb_core::ElementId;

/// Double-tap window used unless the session is configured otherwise.
pub const DOUBLE_TAP_MS: f64 = 300.0;

/// Distance within which a mouse event counts as emulated from a touch end.
const EMULATION_SLOP: f32 = 1.0;

/// The device an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

/// A normalized input event in frame coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown {
        x: f32,
        y: f32,
        source: PointerSource,
    },

    /// Pointer moved (mouse move, touch move).
    PointerMove {
        x: f32,
        y: f32,
        source: PointerSource,
    },

    /// Pointer released.
    PointerUp {
        x: f32,
        y: f32,
        source: PointerSource,
    },

    /// Double-click, or a double tap recognised by [`TapTracker`].
    DoubleActivate { x: f32, y: f32 },

    /// A touch that ended; paired into double taps by the session.
    Tap { x: f32, y: f32, time_ms: f64 },

    /// Content typed into the text element being edited in place.
    TextInput { content: String },

    /// The in-place editor lost focus.
    FocusLost,

    /// The shape-label prompt was dismissed. `None` means cancelled.
    ModalResolved { value: Option<String> },
}

/// Phase of a touch event as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl InputEvent {
    pub fn from_pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            source: PointerSource::Mouse,
        }
    }

    pub fn from_pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            x,
            y,
            source: PointerSource::Mouse,
        }
    }

    pub fn from_pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            x,
            y,
            source: PointerSource::Mouse,
        }
    }

    /// Pointer event for a touch event. For `End`, pass the changed
    /// touches; the active list is empty by then.
    pub fn from_touches(phase: TouchPhase, touches: &[TouchPoint]) -> Option<Self> {
        let &TouchPoint { x, y } = touches.first()?;
        let source = PointerSource::Touch;
        Some(match phase {
            TouchPhase::Start => Self::PointerDown { x, y, source },
            TouchPhase::Move => Self::PointerMove { x, y, source },
            TouchPhase::End => Self::PointerUp { x, y, source },
        })
    }

    /// Extract position if this is a positional event.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::DoubleActivate { x, y }
            | Self::Tap { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }
}

// ─── Double tap ──────────────────────────────────────────────────────────

/// Pairs taps on the same element into double taps.
///
/// A second tap on the same element within the window completes a double
/// tap and resets the tracker. A tap after the window elapsed starts over.
#[derive(Debug, Clone)]
pub struct TapTracker {
    window_ms: f64,
    last: Option<(ElementId, f64)>,
}

impl Default for TapTracker {
    fn default() -> Self {
        Self::new(DOUBLE_TAP_MS)
    }
}

impl TapTracker {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last: None,
        }
    }

    /// Record a tap on `target` at `time_ms`. Returns `true` when it
    /// completes a double tap.
    pub fn tap(&mut self, target: ElementId, time_ms: f64) -> bool {
        match self.last {
            Some((prev, at)) if prev == target && time_ms - at <= self.window_ms => {
                self.last = None;
                true
            }
            _ => {
                self.last = Some((target, time_ms));
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

// ─── Emulated mouse events ───────────────────────────────────────────────

/// Drops the compatibility mouse events a browser fires for a touch.
///
/// While a touch is down every mouse event is dropped. After it ends, the
/// emulated move/down/up land on the touch-end point; the first mouse-up
/// there, or any mouse event elsewhere, hands control back to the mouse.
#[derive(Debug, Clone, Default)]
pub struct EmulatedMouseFilter {
    touch_down: bool,
    touch_end: Option<(f32, f32)>,
}

impl EmulatedMouseFilter {
    /// Whether `event` should reach the controller.
    pub fn admit(&mut self, event: &InputEvent) -> bool {
        let (x, y, source, is_up) = match *event {
            InputEvent::PointerDown { x, y, source } | InputEvent::PointerMove { x, y, source } => {
                (x, y, source, false)
            }
            InputEvent::PointerUp { x, y, source } => (x, y, source, true),
            _ => return true,
        };

        match source {
            PointerSource::Touch => {
                self.touch_down = !is_up;
                self.touch_end = is_up.then_some((x, y));
                true
            }
            PointerSource::Mouse if self.touch_down => false,
            PointerSource::Mouse => match self.touch_end {
                Some((tx, ty)) if (tx - x).abs() <= EMULATION_SLOP && (ty - y).abs() <= EMULATION_SLOP => {
                    if is_up {
                        self.touch_end = None;
                    }
                    false
                }
                _ => {
                    self.touch_end = None;
                    true
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn touch_uses_first_point() {
        let touches = [TouchPoint { x: 10.0, y: 20.0 }, TouchPoint { x: 99.0, y: 99.0 }];
        let event = InputEvent::from_touches(TouchPhase::Start, &touches).unwrap();
        assert_eq!(
            event,
            InputEvent::PointerDown {
                x: 10.0,
                y: 20.0,
                source: PointerSource::Touch,
            }
        );
        assert_eq!(event.position(), Some((10.0, 20.0)));
    }

    #[test]
    fn touch_without_points_is_dropped() {
        assert_eq!(InputEvent::from_touches(TouchPhase::Move, &[]), None);
    }

    #[test]
    fn second_tap_inside_window_is_double() {
        let id = ElementId::intern("shape_tap");
        let mut taps = TapTracker::default();
        assert!(!taps.tap(id, 1000.0));
        assert!(taps.tap(id, 1250.0));
        // Consumed: a third tap starts a new pair.
        assert!(!taps.tap(id, 1300.0));
    }

    #[test]
    fn late_tap_starts_over() {
        let id = ElementId::intern("text_tap");
        let mut taps = TapTracker::default();
        assert!(!taps.tap(id, 0.0));
        assert!(!taps.tap(id, 301.0));
        assert!(taps.tap(id, 500.0));
    }

    #[test]
    fn mouse_events_echoing_a_touch_are_dropped() {
        let mut filter = EmulatedMouseFilter::default();
        let touch = |phase, x, y| InputEvent::from_touches(phase, &[TouchPoint { x, y }]).unwrap();

        assert!(filter.admit(&touch(TouchPhase::Start, 50.0, 50.0)));
        assert!(!filter.admit(&InputEvent::from_pointer_move(50.0, 50.0)));
        assert!(filter.admit(&touch(TouchPhase::End, 60.0, 70.0)));

        assert!(!filter.admit(&InputEvent::from_pointer_move(60.0, 70.0)));
        assert!(!filter.admit(&InputEvent::from_pointer_down(60.0, 70.0)));
        assert!(!filter.admit(&InputEvent::from_pointer_up(60.0, 70.0)));
        // The emulated sequence is over; a real click at the same spot passes.
        assert!(filter.admit(&InputEvent::from_pointer_down(60.0, 70.0)));
    }

    #[test]
    fn mouse_elsewhere_after_touch_is_real() {
        let mut filter = EmulatedMouseFilter::default();
        let end = InputEvent::from_touches(TouchPhase::End, &[TouchPoint { x: 10.0, y: 10.0 }]).unwrap();
        assert!(filter.admit(&end));
        assert!(filter.admit(&InputEvent::from_pointer_move(200.0, 90.0)));
        assert!(filter.admit(&InputEvent::from_pointer_down(10.0, 10.0)));
        assert!(filter.admit(&InputEvent::FocusLost));
    }

    #[test]
    fn taps_on_different_elements_do_not_pair() {
        let mut taps = TapTracker::default();
        assert!(!taps.tap(ElementId::intern("a_tap"), 0.0));
        assert!(!taps.tap(ElementId::intern("b_tap"), 100.0));
    }
}
