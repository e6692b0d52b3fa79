//! Scroll-to-top button behaviour.
//!
//! The button is hidden until the page has been scrolled past a threshold.
//! Scroll events come from an injected [`Viewport`] so the widget can be
//! mounted against a real page bridge or a test double; the subscription is
//! removed when the mounted handle is dropped.

use std::{cell::Cell, rc::Rc};

pub const SCROLL_THRESHOLD_PX: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

pub type ListenerId = u64;
pub type ScrollListener = Box<dyn FnMut(f64)>;

/// Source of vertical scroll offsets, plus the ability to scroll.
pub trait Viewport {
    fn subscribe(&self, listener: ScrollListener) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
    fn scroll_to(&self, command: ScrollCommand);
}

/// Pure two-state machine: no hysteresis, re-evaluated on every offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollToTop {
    threshold: f64,
    visibility: Visibility,
}

impl Default for ScrollToTop {
    fn default() -> Self {
        ScrollToTop::new(f64::from(SCROLL_THRESHOLD_PX))
    }
}

impl ScrollToTop {
    pub fn new(threshold: f64) -> Self {
        ScrollToTop {
            threshold,
            visibility: Visibility::Hidden,
        }
    }

    pub fn on_scroll(&mut self, offset: f64) -> Visibility {
        self.visibility = if offset > self.threshold {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        self.visibility
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// What a click does: a smooth scroll to the top, but only while shown.
    pub fn click(&self) -> Option<ScrollCommand> {
        match self.visibility {
            Visibility::Visible => Some(ScrollCommand {
                top: 0.0,
                behavior: ScrollBehavior::Smooth,
            }),
            Visibility::Hidden => None,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.visibility {
            Visibility::Visible => "scroll-top visible",
            Visibility::Hidden => "scroll-top",
        }
    }

    /// Subscribes a fresh widget to `viewport`.
    pub fn mount<V: Viewport>(viewport: &V) -> MountedScrollToTop<'_, V> {
        let state = Rc::new(Cell::new(ScrollToTop::default()));
        let listener_state = Rc::clone(&state);
        let id = viewport.subscribe(Box::new(move |offset| {
            let mut widget = listener_state.get();
            widget.on_scroll(offset);
            listener_state.set(widget);
        }));
        MountedScrollToTop {
            viewport,
            id,
            state,
        }
    }
}

/// A widget attached to a viewport. Dropping it removes the listener.
pub struct MountedScrollToTop<'a, V: Viewport> {
    viewport: &'a V,
    id: ListenerId,
    state: Rc<Cell<ScrollToTop>>,
}

impl<V: Viewport> MountedScrollToTop<'_, V> {
    pub fn visibility(&self) -> Visibility {
        self.state.get().visibility()
    }

    pub fn click(&self) -> bool {
        match self.state.get().click() {
            Some(command) => {
                self.viewport.scroll_to(command);
                true
            }
            None => false,
        }
    }
}

impl<V: Viewport> Drop for MountedScrollToTop<'_, V> {
    fn drop(&mut self) {
        self.viewport.unsubscribe(self.id);
    }
}
