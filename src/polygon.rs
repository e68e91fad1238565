use crate::error::AnnotatorError;
use crate::mask::{FillMode, MaskBuffer, Point};

pub const MIN_POLYGON_POINTS: usize = 3;

/// Modifier keys held during a primary click.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub fill: bool,
    pub erase: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickAction {
    Append,
    Commit(FillMode),
}

impl ClickAction {
    /// fill alone commits as set, fill + erase commits as clear, anything
    /// else appends a point.
    pub fn from_modifiers(modifiers: Modifiers) -> Self {
        match (modifiers.fill, modifiers.erase) {
            (true, true) => ClickAction::Commit(FillMode::Clear),
            (true, false) => ClickAction::Commit(FillMode::Set),
            (false, _) => ClickAction::Append,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    Empty,
    Building,
}

#[derive(Clone, Debug, Default)]
pub struct PolygonEditor {
    points: Vec<Point>,
}

impl PolygonEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditorState {
        if self.points.is_empty() {
            EditorState::Empty
        } else {
            EditorState::Building
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn cancel(&mut self) {
        self.points.clear();
    }

    /// Rasterizes the path into `mask` and clears it. With fewer than three
    /// points nothing changes and the points are kept.
    pub fn commit(
        &mut self,
        mask: &mut MaskBuffer,
        mode: FillMode,
    ) -> Result<usize, AnnotatorError> {
        let count = self.points.len();
        if count < MIN_POLYGON_POINTS {
            return Err(AnnotatorError::InsufficientPoints {
                count,
                required: MIN_POLYGON_POINTS,
            });
        }
        mask.fill_polygon(&self.points, mode);
        self.points.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: Modifiers = Modifiers {
        fill: false,
        erase: false,
    };
    const FILL: Modifiers = Modifiers {
        fill: true,
        erase: false,
    };
    const BOTH: Modifiers = Modifiers {
        fill: true,
        erase: true,
    };
    const ERASE_ONLY: Modifiers = Modifiers {
        fill: false,
        erase: true,
    };

    #[test]
    fn modifier_matrix() {
        assert_eq!(ClickAction::from_modifiers(NONE), ClickAction::Append);
        assert_eq!(
            ClickAction::from_modifiers(FILL),
            ClickAction::Commit(FillMode::Set)
        );
        assert_eq!(
            ClickAction::from_modifiers(BOTH),
            ClickAction::Commit(FillMode::Clear)
        );
        assert_eq!(ClickAction::from_modifiers(ERASE_ONLY), ClickAction::Append);
    }

    #[test]
    fn states_follow_points() {
        let mut editor = PolygonEditor::new();
        assert_eq!(editor.state(), EditorState::Empty);
        editor.add_point(Point::new(1, 1));
        assert_eq!(editor.state(), EditorState::Building);
        editor.add_point(Point::new(2, 1));
        assert_eq!(editor.points().len(), 2);
        editor.cancel();
        assert_eq!(editor.state(), EditorState::Empty);
    }

    #[test]
    fn commit_with_two_points_keeps_them() {
        let mut editor = PolygonEditor::new();
        let mut mask = MaskBuffer::new(10, 10);
        editor.add_point(Point::new(1, 1));
        editor.add_point(Point::new(8, 1));
        let err = editor.commit(&mut mask, FillMode::Set).unwrap_err();
        assert!(matches!(
            err,
            AnnotatorError::InsufficientPoints {
                count: 2,
                required: 3
            }
        ));
        assert_eq!(editor.state(), EditorState::Building);
        assert_eq!(editor.points(), &[Point::new(1, 1), Point::new(8, 1)]);
        assert_eq!(mask.count_set(), 0);
    }

    #[test]
    fn commit_fills_then_empties() {
        let mut editor = PolygonEditor::new();
        let mut mask = MaskBuffer::new(10, 10);
        for (x, y) in [(1, 1), (8, 1), (8, 8), (1, 8)] {
            editor.add_point(Point::new(x, y));
        }
        assert_eq!(editor.commit(&mut mask, FillMode::Set).unwrap(), 4);
        assert_eq!(editor.state(), EditorState::Empty);
        assert_eq!(mask.count_set(), 64);

        for (x, y) in [(3, 3), (6, 3), (6, 6), (3, 6)] {
            editor.add_point(Point::new(x, y));
        }
        editor.commit(&mut mask, FillMode::Clear).unwrap();
        assert_eq!(mask.count_set(), 64 - 16);
    }

    #[test]
    fn commit_on_empty_editor_fails() {
        let mut editor = PolygonEditor::new();
        let mut mask = MaskBuffer::new(4, 4);
        assert!(editor.commit(&mut mask, FillMode::Clear).is_err());
        assert_eq!(editor.state(), EditorState::Empty);
    }
}
