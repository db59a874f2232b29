//! Defect oracle: pure predicates over the instance defect catalog.
//!
//! All tests use strict interior comparisons: a rectangle or cut line that
//! only touches a defect's boundary does not intersect it. Predicates
//! return the lowest-id offending defect for determinism.

use crate::instance::Instance;
use crate::types::{DefectId, Length, PlateId, Rect};

/// First defect on `p` overlapping the given rectangle with positive area.
pub fn rect_intersects_defects(
    instance: &Instance,
    left: Length,
    right: Length,
    bottom: Length,
    top: Length,
    p: PlateId,
) -> Option<DefectId> {
    let rect = Rect::new(left, bottom, right, top);
    instance
        .defects(p)
        .find(|d| d.rect.overlaps(&rect))
        .map(|d| d.id)
}

/// First defect on `p` whose interior is crossed by a full-height vertical
/// cut at `x` (a 1-cut line).
pub fn x_intersects_defect(instance: &Instance, x: Length, p: PlateId) -> Option<DefectId> {
    instance
        .defects(p)
        .find(|d| d.rect.left < x && x < d.rect.right)
        .map(|d| d.id)
}

/// First defect on `p` crossed by a vertical cut at `x` spanning
/// `bottom..top` (a 3-cut line inside a 2-cut band).
pub fn x_span_intersects_defect(
    instance: &Instance,
    x: Length,
    bottom: Length,
    top: Length,
    p: PlateId,
) -> Option<DefectId> {
    instance
        .defects(p)
        .find(|d| d.rect.left < x && x < d.rect.right && d.rect.bottom < top && bottom < d.rect.top)
        .map(|d| d.id)
}

/// First defect on `p` crossed by a horizontal cut at `y` spanning
/// `left..right` (a 2-cut line inside a 1-cut, or a 4-cut line).
pub fn y_intersects_defect(
    instance: &Instance,
    left: Length,
    right: Length,
    y: Length,
    p: PlateId,
) -> Option<DefectId> {
    instance
        .defects(p)
        .find(|d| d.rect.bottom < y && y < d.rect.top && d.rect.left < right && left < d.rect.right)
        .map(|d| d.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_support::instance;

    fn one_defect() -> Instance {
        // Defect spans [10,20]x[30,40] on plate 0.
        instance((100, 100), 2, &[&[(30, 20)]], &[(0, 10, 30, 10, 10)])
    }

    #[test]
    fn test_rect_positive_overlap_only() {
        let ins = one_defect();
        let p = PlateId(0);
        assert_eq!(
            rect_intersects_defects(&ins, 0, 15, 0, 35, p),
            Some(DefectId(0))
        );
        // Flush against the defect's left edge
        assert_eq!(rect_intersects_defects(&ins, 0, 10, 0, 100, p), None);
        // Flush against its top edge
        assert_eq!(rect_intersects_defects(&ins, 0, 100, 40, 100, p), None);
        // Other plate has no defects
        assert_eq!(rect_intersects_defects(&ins, 0, 100, 0, 100, PlateId(1)), None);
    }

    #[test]
    fn test_vertical_line() {
        let ins = one_defect();
        let p = PlateId(0);
        assert_eq!(x_intersects_defect(&ins, 15, p), Some(DefectId(0)));
        assert_eq!(x_intersects_defect(&ins, 10, p), None);
        assert_eq!(x_intersects_defect(&ins, 20, p), None);
    }

    #[test]
    fn test_vertical_span() {
        let ins = one_defect();
        let p = PlateId(0);
        assert_eq!(x_span_intersects_defect(&ins, 15, 0, 100, p), Some(DefectId(0)));
        // Span entirely below the defect
        assert_eq!(x_span_intersects_defect(&ins, 15, 0, 30, p), None);
        // Span entirely above
        assert_eq!(x_span_intersects_defect(&ins, 15, 40, 100, p), None);
    }

    #[test]
    fn test_horizontal_line() {
        let ins = one_defect();
        let p = PlateId(0);
        assert_eq!(y_intersects_defect(&ins, 0, 100, 35, p), Some(DefectId(0)));
        assert_eq!(y_intersects_defect(&ins, 0, 100, 30, p), None);
        assert_eq!(y_intersects_defect(&ins, 0, 100, 40, p), None);
        // Segment stops left of the defect
        assert_eq!(y_intersects_defect(&ins, 0, 10, 35, p), None);
    }
}
