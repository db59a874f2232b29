//! Front snapshots, the dominance partial order used to prune search
//! branches, and the scoring family used to rank partial solutions.

use crate::insertion::Insertion;
use crate::params::Params;
use crate::solution::{Solution, XGrowth, YGrowth};
use crate::types::{Length, PlateId};

/// Compact snapshot of how far a partial plan has progressed on its
/// active plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Front {
    pub plate: PlateId,
    pub x1_prev: Length,
    pub x3_curr: Length,
    pub x1_curr: Length,
    pub y2_prev: Length,
    pub y2_curr: Length,
    pub z1: XGrowth,
    pub z2: YGrowth,
}

impl<'a> Solution<'a> {
    /// Current front; `None` before the first plate is opened.
    pub fn front(&self) -> Option<Front> {
        let plate = self.plate()?;
        Some(Front {
            plate,
            x1_prev: self.x1_prev(),
            x3_curr: self.x3_curr(),
            x1_curr: self.x1_curr(),
            y2_prev: self.y2_prev(),
            y2_curr: self.y2_curr(),
            z1: self.z1(),
            z2: self.z2(),
        })
    }

    /// Front this solution would have after committing `ins`, without
    /// mutating anything. Lets the driver prune candidate moves against
    /// sibling branches before paying for a clone.
    pub fn front_after(&self, ins: &Insertion) -> Front {
        let (plate, x1_prev, y2_prev) = match ins.df {
            -1 => (PlateId(self.plate_number()), 0, 0),
            0 => (PlateId(self.plate_number() - 1), self.x1_curr(), 0),
            1 => (
                PlateId(self.plate_number() - 1),
                self.x1_prev(),
                self.y2_curr(),
            ),
            2 => (
                PlateId(self.plate_number() - 1),
                self.x1_prev(),
                self.y2_prev(),
            ),
            _ => panic!("invalid insertion depth {}", ins.df),
        };
        Front {
            plate,
            x1_prev,
            x3_curr: ins.x3,
            x1_curr: ins.x1,
            y2_prev,
            y2_curr: ins.y2,
            z1: ins.z1,
            z2: ins.z2,
        }
    }
}

fn quantize(c: Length, tolerance: Length) -> Length {
    if tolerance > 0 { c / tolerance } else { c }
}

/// Partial order over fronts: `f1` dominates `f2` iff both are on the same
/// plate, every boundary of `f1` leaves at least as much room as `f2`'s
/// within the configured tolerance, and `f1`'s growth flags are at least
/// as permissive. Reflexive and transitive; incomparable fronts exist.
pub fn dominates(f1: &Front, f2: &Front, params: &Params) -> bool {
    let t = params.dominance_tolerance;
    f1.plate == f2.plate
        && quantize(f1.x1_prev, t) <= quantize(f2.x1_prev, t)
        && quantize(f1.x3_curr, t) <= quantize(f2.x3_curr, t)
        && quantize(f1.x1_curr, t) <= quantize(f2.x1_curr, t)
        && quantize(f1.y2_prev, t) <= quantize(f2.y2_prev, t)
        && quantize(f1.y2_curr, t) <= quantize(f2.y2_curr, t)
        && f1.z1.permissiveness() >= f2.z1.permissiveness()
        && f1.z2.permissiveness() >= f2.z2.permissiveness()
}

/// Ranks partial solutions for beam-style pruning. The id picks the
/// scoring function:
/// 0 lowest waste fraction, 1 highest fraction of items placed,
/// 2 waste fraction then item fraction, 3 best balance between placed and
/// remaining mean item area.
#[derive(Debug, Clone, Copy)]
pub struct SolutionCompare {
    pub id: u8,
}

impl SolutionCompare {
    pub fn new(id: u8) -> Self {
        assert!(id <= 3, "unknown comparator id {id}");
        Self { id }
    }

    pub fn ordering(&self, s1: &Solution<'_>, s2: &Solution<'_>) -> std::cmp::Ordering {
        match self.id {
            0 => s1.waste_percentage().total_cmp(&s2.waste_percentage()),
            1 => s2.percentage_items().total_cmp(&s1.percentage_items()),
            2 => s1
                .waste_percentage()
                .total_cmp(&s2.waste_percentage())
                .then(s2.percentage_items().total_cmp(&s1.percentage_items())),
            _ => balance(s1).total_cmp(&balance(s2)),
        }
    }

    /// True when `s1` should rank strictly before `s2`.
    pub fn better(&self, s1: &Solution<'_>, s2: &Solution<'_>) -> bool {
        self.ordering(s1, s2) == std::cmp::Ordering::Less
    }
}

fn balance(s: &Solution<'_>) -> f64 {
    (s.diff_percentage_means() - 1.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_support::instance;

    fn front(coords: (Length, Length, Length, Length, Length), z1: XGrowth, z2: YGrowth) -> Front {
        Front {
            plate: PlateId(0),
            x1_prev: coords.0,
            x3_curr: coords.1,
            x1_curr: coords.2,
            y2_prev: coords.3,
            y2_curr: coords.4,
            z1,
            z2,
        }
    }

    #[test]
    fn test_reflexive() {
        let p = Params::default();
        let f = front((10, 40, 50, 20, 60), XGrowth::MinWaste, YGrowth::Frozen);
        assert!(dominates(&f, &f, &p));
    }

    #[test]
    fn test_transitive() {
        let p = Params::default();
        let f1 = front((0, 30, 40, 0, 50), XGrowth::Free, YGrowth::Free);
        let f2 = front((10, 35, 45, 10, 55), XGrowth::Free, YGrowth::MinWaste);
        let f3 = front((10, 40, 50, 20, 60), XGrowth::MinWaste, YGrowth::MinWaste);
        assert!(dominates(&f1, &f2, &p));
        assert!(dominates(&f2, &f3, &p));
        assert!(dominates(&f1, &f3, &p));
    }

    #[test]
    fn test_incomparable_pair() {
        let p = Params::default();
        let f1 = front((0, 30, 40, 0, 80), XGrowth::Free, YGrowth::Free);
        let f2 = front((0, 50, 60, 0, 40), XGrowth::Free, YGrowth::Free);
        assert!(!dominates(&f1, &f2, &p));
        assert!(!dominates(&f2, &f1, &p));
    }

    #[test]
    fn test_plate_and_flags_matter() {
        let p = Params::default();
        let f1 = front((0, 30, 40, 0, 50), XGrowth::MinWaste, YGrowth::Free);
        let f2 = front((0, 30, 40, 0, 50), XGrowth::Free, YGrowth::Free);
        // Same coordinates, but f1's 1-cut is harder to widen.
        assert!(!dominates(&f1, &f2, &p));
        assert!(dominates(&f2, &f1, &p));

        let other_plate = Front {
            plate: PlateId(1),
            ..f1
        };
        assert!(!dominates(&f2, &other_plate, &p));
    }

    #[test]
    fn test_tolerance_quantizes() {
        let p = Params::default().with_dominance_tolerance(10);
        let f1 = front((0, 35, 45, 0, 55), XGrowth::Free, YGrowth::Free);
        let f2 = front((0, 31, 41, 0, 51), XGrowth::Free, YGrowth::Free);
        // Within one bucket the coordinates compare equal both ways.
        assert!(dominates(&f1, &f2, &p));
        assert!(dominates(&f2, &f1, &p));
        let exact = Params::default();
        assert!(!dominates(&f1, &f2, &exact));
    }

    #[test]
    fn test_front_after_matches_commit() {
        let ins = instance(
            (100, 100),
            2,
            &[&[(30, 20), (25, 25)], &[(40, 35)]],
            &[(0, 60, 0, 10, 100)],
        );
        let params = Params::default();
        let mut sol = Solution::new(&ins);
        for _ in 0..3 {
            let moves = sol.all_valid_insertions(&params, true);
            let Some(first) = moves.first() else { break };
            let predicted = sol.front_after(first);
            sol.add_item(first);
            assert_eq!(sol.front(), Some(predicted));
        }
    }

    #[test]
    fn test_comparator_family() {
        let ins = instance((100, 100), 2, &[&[(30, 20), (40, 40)]], &[]);
        let params = Params::default();
        let empty = Solution::new(&ins);
        let mut one = empty.clone();
        let first = one.all_valid_insertions(&params, true)[0];
        one.add_item(&first);

        // More items placed ranks higher under id 1.
        assert!(SolutionCompare::new(1).better(&one, &empty));
        // Identical solutions never rank strictly.
        assert!(!SolutionCompare::new(2).better(&one, &one));
    }

    #[test]
    #[should_panic(expected = "unknown comparator")]
    fn test_comparator_id_bounds() {
        SolutionCompare::new(9);
    }
}
