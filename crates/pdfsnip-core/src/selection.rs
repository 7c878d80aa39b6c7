//! Selection tracking: pointer press/drag/release into a committed rectangle.
//!
//! [`SelectionTracker`] is the only owner of [`SelectionState`]. It is driven
//! exclusively through [`on_pointer_down`](SelectionTracker::on_pointer_down),
//! [`on_pointer_move`](SelectionTracker::on_pointer_move) and
//! [`on_pointer_up`](SelectionTracker::on_pointer_up); a drag commits at most
//! one rectangle.

use crate::geometry::{Display, Point, Rect};
use crate::options::DEFAULT_MIN_SELECTION;

/// State of the tracker's press/drag/release machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionState {
    /// No drag in progress and nothing committed.
    #[default]
    Idle,
    /// Pointer is held down.
    Dragging { origin: Point, current: Point },
    /// The last drag produced this rectangle.
    Committed(Rect<Display>),
}

/// Converts pointer events in display space into normalized rectangles.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    state: SelectionState,
    min_selection: f64,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SELECTION)
    }
}

impl SelectionTracker {
    /// Create a tracker that commits drags larger than `min_selection` on
    /// both axes.
    pub fn new(min_selection: f64) -> Self {
        Self {
            state: SelectionState::Idle,
            min_selection,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn min_selection(&self) -> f64 {
        self.min_selection
    }

    /// Returns `true` while the pointer is held down.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectionState::Dragging { .. })
    }

    /// The live rectangle while dragging, or the committed one.
    pub fn current_rect(&self) -> Option<Rect<Display>> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Dragging { origin, current } => Some(Rect::from_corners(origin, current)),
            SelectionState::Committed(rect) => Some(rect),
        }
    }

    /// The committed rectangle, if the last drag produced one.
    pub fn committed(&self) -> Option<Rect<Display>> {
        match self.state {
            SelectionState::Committed(rect) => Some(rect),
            _ => None,
        }
    }

    /// Start a new drag at `point`, abandoning any previous selection.
    pub fn on_pointer_down(&mut self, point: Point) {
        self.state = SelectionState::Dragging {
            origin: point,
            current: point,
        };
    }

    /// Extend the drag to `point`. No-op unless a drag is active.
    pub fn on_pointer_move(&mut self, point: Point) {
        if let SelectionState::Dragging { origin, .. } = self.state {
            self.state = SelectionState::Dragging {
                origin,
                current: point,
            };
        }
    }

    /// End the drag.
    ///
    /// Returns the committed rectangle if both its width and height exceed
    /// the minimum selection; otherwise the drag is discarded and `None` is
    /// returned. Calling this without an active drag returns `None` and
    /// leaves the state unchanged.
    pub fn on_pointer_up(&mut self) -> Option<Rect<Display>> {
        let SelectionState::Dragging { origin, current } = self.state else {
            return None;
        };

        let rect = Rect::from_corners(origin, current);
        if rect.width() > self.min_selection && rect.height() > self.min_selection {
            self.state = SelectionState::Committed(rect);
            Some(rect)
        } else {
            self.state = SelectionState::Idle;
            None
        }
    }

    /// Drop any drag or committed selection (e.g. the document changed).
    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }
}
