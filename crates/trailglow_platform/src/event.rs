//! Host events consumed by the overlay

use trailglow_core::{Point, Size};

/// Host events
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Viewport-related event
    Window(WindowEvent),
    /// Pointer input event
    Input(InputEvent),
}

/// Viewport events
#[derive(Clone, Debug, PartialEq)]
pub enum WindowEvent {
    /// Viewport was resized
    Resized {
        /// New width in logical pixels
        width: f32,
        /// New height in logical pixels
        height: f32,
    },
}

/// Input events
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to a position
    PointerMoved {
        /// X position in viewport coordinates
        x: f32,
        /// Y position in viewport coordinates
        y: f32,
    },
}

/// The kind of event a listener subscribes to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Viewport resize
    Resize,
    /// Pointer movement
    PointerMove,
}

impl EventKind {
    /// DOM event type name for this kind
    pub fn dom_event_type(self) -> &'static str {
        match self {
            EventKind::Resize => "resize",
            EventKind::PointerMove => "mousemove",
        }
    }
}

impl Event {
    /// Convenience constructor for a resize event
    pub fn resized(width: f32, height: f32) -> Self {
        Event::Window(WindowEvent::Resized { width, height })
    }

    /// Convenience constructor for a pointer move event
    pub fn pointer_moved(x: f32, y: f32) -> Self {
        Event::Input(InputEvent::PointerMoved { x, y })
    }

    /// Which listener kind receives this event
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Window(WindowEvent::Resized { .. }) => EventKind::Resize,
            Event::Input(InputEvent::PointerMoved { .. }) => EventKind::PointerMove,
        }
    }

    /// New viewport size, for resize events
    pub fn viewport_size(&self) -> Option<Size> {
        match self {
            Event::Window(WindowEvent::Resized { width, height }) => {
                Some(Size::new(*width, *height))
            }
            _ => None,
        }
    }

    /// Pointer position, for pointer events
    pub fn pointer_position(&self) -> Option<Point> {
        match self {
            Event::Input(InputEvent::PointerMoved { x, y }) => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        assert_eq!(Event::resized(1.0, 2.0).kind(), EventKind::Resize);
        assert_eq!(Event::pointer_moved(1.0, 2.0).kind(), EventKind::PointerMove);
    }

    #[test]
    fn test_payload_accessors() {
        let resize = Event::resized(400.0, 300.0);
        assert_eq!(resize.viewport_size(), Some(Size::new(400.0, 300.0)));
        assert_eq!(resize.pointer_position(), None);

        let moved = Event::pointer_moved(5.0, 6.0);
        assert_eq!(moved.pointer_position(), Some(Point::new(5.0, 6.0)));
        assert_eq!(moved.viewport_size(), None);
    }
}
