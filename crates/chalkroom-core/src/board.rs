//! Board: the ordered element list, the in-progress gesture and its history.

use crate::elements::{Element, ElementError, SerializableColor, ToolKind};
use crate::history::{DEFAULT_HISTORY_CAPACITY, History};
use kurbo::{Point, Rect};

/// Maximum number of committed elements a board keeps.
pub const DEFAULT_MAX_ELEMENTS: usize = 500;

/// The element being drawn by the active pointer gesture.
#[derive(Debug, Clone, PartialEq)]
struct Gesture {
    /// Where the pointer went down, in logical coordinates.
    start: Point,
    /// Live preview, painted like a committed element.
    element: Element,
}

/// Committed elements in z-order (back to front) plus the active gesture.
#[derive(Debug, Clone)]
pub struct Board {
    elements: Vec<Element>,
    in_progress: Option<Gesture>,
    history: History,
    max_elements: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_ELEMENTS)
    }
}

impl Board {
    pub fn new(history_capacity: usize, max_elements: usize) -> Self {
        Self {
            elements: Vec::new(),
            in_progress: None,
            history: History::with_capacity(history_capacity),
            max_elements: max_elements.max(1),
        }
    }

    /// Committed elements, back to front.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The preview element of the active gesture.
    pub fn in_progress(&self) -> Option<&Element> {
        self.in_progress.as_ref().map(|g| &g.element)
    }

    /// Whether a pointer gesture currently owns an in-progress element.
    pub fn is_drawing(&self) -> bool {
        self.in_progress.is_some()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Start a drag gesture at a logical point. Any previous gesture is dropped.
    pub fn begin_gesture(
        &mut self,
        tool: ToolKind,
        start: Point,
        color: SerializableColor,
    ) -> Result<(), ElementError> {
        let element = Element::begin(tool, start, color)?;
        if self.in_progress.is_some() {
            log::debug!("Replacing unfinished gesture");
        }
        self.in_progress = Some(Gesture { start, element });
        Ok(())
    }

    /// Extend the in-progress element to a logical point.
    /// Returns false when idle or when the point is not finite.
    pub fn update_in_progress(&mut self, point: Point) -> bool {
        let Some(gesture) = self.in_progress.as_mut() else {
            return false;
        };
        if !(point.x.is_finite() && point.y.is_finite()) {
            return false;
        }
        gesture.element.drag_to(gesture.start, point);
        true
    }

    /// Commit the in-progress element. Returns false when idle.
    pub fn commit_in_progress(&mut self) -> bool {
        match self.in_progress.take() {
            Some(gesture) => {
                self.add_element(gesture.element);
                true
            }
            None => false,
        }
    }

    /// Drop the in-progress element without committing it.
    pub fn cancel_in_progress(&mut self) -> bool {
        self.in_progress.take().is_some()
    }

    /// Append a committed element, recording the pre-action state.
    pub fn add_element(&mut self, element: Element) {
        self.history.snapshot(&self.elements);
        self.elements.push(element);
        if self.elements.len() > self.max_elements {
            let overflow = self.elements.len() - self.max_elements;
            self.elements.drain(..overflow);
        }
    }

    /// Remove every committed element. Returns false if already empty.
    pub fn clear(&mut self) -> bool {
        if self.elements.is_empty() {
            return false;
        }
        self.history.snapshot(&self.elements);
        self.elements.clear();
        true
    }

    /// Restore the state before the last committed action.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.elements)
    }

    /// Re-apply the last undone action.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.elements)
    }

    /// Replace the whole element sequence with a remote copy.
    ///
    /// History is dropped: its snapshots describe a document that no longer
    /// exists locally.
    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        self.history.clear();
    }

    /// Elements hit at a logical point, front-most first.
    pub fn elements_at(&self, point: Point, tolerance: f64) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, el)| el.hit_test(point, tolerance))
            .map(|(i, _)| i)
            .collect()
    }

    /// Bounding box of all committed elements.
    pub fn bounds(&self) -> Option<Rect> {
        self.elements
            .iter()
            .map(Element::bounds)
            .reduce(|acc, b| acc.union(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ACCENT_COLOR;

    fn drag(board: &mut Board, tool: ToolKind, from: (f64, f64), to: (f64, f64)) {
        board
            .begin_gesture(tool, Point::new(from.0, from.1), ACCENT_COLOR)
            .unwrap();
        board.update_in_progress(Point::new(to.0, to.1));
        assert!(board.commit_in_progress());
    }

    #[test]
    fn test_rect_drag_then_undo() {
        let mut board = Board::default();
        drag(&mut board, ToolKind::Rectangle, (10.0, 10.0), (110.0, 60.0));

        assert_eq!(board.len(), 1);
        let Element::Rectangle(frame) = &board.elements()[0] else {
            panic!("expected rectangle");
        };
        assert_eq!(frame.anchor(), Point::new(10.0, 10.0));
        assert!((frame.width - 100.0).abs() < f64::EPSILON);
        assert!((frame.height - 50.0).abs() < f64::EPSILON);

        assert!(board.undo());
        assert_eq!(board.len(), 0);
    }

    #[test]
    fn test_undo_count_matches_before_add() {
        let mut board = Board::default();
        let mut counts = Vec::new();
        for i in 0..8 {
            counts.push(board.len());
            let x = f64::from(i) * 10.0;
            drag(&mut board, ToolKind::Line, (x, 0.0), (x + 5.0, 5.0));
        }
        while let Some(expected) = counts.pop() {
            assert!(board.undo());
            assert_eq!(board.len(), expected);
        }
        assert!(!board.undo());
    }

    #[test]
    fn test_preview_tracks_pointer() {
        let mut board = Board::default();
        board.begin_gesture(ToolKind::Pen, Point::new(0.0, 0.0), ACCENT_COLOR).unwrap();
        board.update_in_progress(Point::new(1.0, 1.0));
        board.update_in_progress(Point::new(2.0, 2.0));
        assert!(board.is_drawing());
        let Some(Element::Stroke(stroke)) = board.in_progress() else {
            panic!("expected stroke preview");
        };
        assert_eq!(stroke.len(), 3);
        assert!(board.is_empty());
    }

    #[test]
    fn test_cancel_leaves_board_untouched() {
        let mut board = Board::default();
        board.begin_gesture(ToolKind::Ellipse, Point::ZERO, ACCENT_COLOR).unwrap();
        assert!(board.cancel_in_progress());
        assert!(!board.commit_in_progress());
        assert!(board.is_empty());
        assert!(!board.can_undo());
    }

    #[test]
    fn test_new_commit_clears_redo() {
        let mut board = Board::default();
        drag(&mut board, ToolKind::Line, (0.0, 0.0), (1.0, 1.0));
        board.undo();
        assert!(board.can_redo());
        drag(&mut board, ToolKind::Line, (2.0, 2.0), (3.0, 3.0));
        assert!(!board.can_redo());
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut board = Board::default();
        drag(&mut board, ToolKind::Line, (0.0, 0.0), (1.0, 1.0));
        drag(&mut board, ToolKind::Line, (2.0, 2.0), (3.0, 3.0));
        assert!(board.clear());
        assert!(board.is_empty());
        assert!(!board.clear());
        assert!(board.undo());
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_element_cap_evicts_oldest() {
        let mut board = Board::new(10, 3);
        for i in 0..4 {
            let x = f64::from(i);
            drag(&mut board, ToolKind::Line, (x, 0.0), (x, 1.0));
        }
        assert_eq!(board.len(), 3);
        let Element::Line(first) = &board.elements()[0] else {
            panic!("expected line");
        };
        assert!((first.x - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_replace_all_drops_history() {
        let mut board = Board::default();
        drag(&mut board, ToolKind::Line, (0.0, 0.0), (1.0, 1.0));
        board.replace_all(Vec::new());
        assert!(board.is_empty());
        assert!(!board.can_undo());
    }

    #[test]
    fn test_elements_at_front_first() {
        let mut board = Board::default();
        drag(&mut board, ToolKind::Rectangle, (0.0, 0.0), (100.0, 100.0));
        drag(&mut board, ToolKind::Rectangle, (0.0, 0.0), (100.0, 50.0));
        let hits = board.elements_at(Point::new(0.0, 25.0), 1.0);
        assert_eq!(hits, vec![1, 0]);
        assert_eq!(board.bounds(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }
}
