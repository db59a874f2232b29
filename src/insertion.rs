//! Insertion generation: enumerates every legal next move from a partial
//! plan. Geometric infeasibility is never an error; an infeasible candidate
//! is simply absent from the returned sequence.

use crate::geometry;
use crate::instance::Defect;
use crate::params::Params;
use crate::solution::{Solution, XGrowth, YGrowth};
use crate::types::{Anchor, Depth, ItemId, Length, Orientation, PlateId, StackId};

/// One legal next tree mutation, fully resolved but not yet committed.
///
/// `x1`, `y2`, `x3` are the positions of the enclosing 1-cut, 2-cut and
/// 3-cut after the move; `x1_max`/`y2_max` bound how far the still-open
/// boundaries may later be pushed before a recorded cut line would run
/// into a defect. An insertion generated against a state that has since
/// been mutated must never be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub j1: Option<ItemId>,
    pub j2: Option<ItemId>,
    pub o1: Orientation,
    pub o2: Orientation,
    /// Anchor of `j1`; `Top` marks an item pinned above a defect.
    pub anchor: Anchor,
    /// Depth the move attaches under: -1 new plate, 0 new 1-cut,
    /// 1 new 2-cut, 2 new 3-cut.
    pub df: Depth,
    pub x1: Length,
    pub y2: Length,
    pub x3: Length,
    pub x1_max: Length,
    pub y2_max: Length,
    pub z1: XGrowth,
    pub z2: YGrowth,
}

impl Insertion {
    /// Number of items the move places (0 for a defect bypass).
    pub fn item_count(&self) -> usize {
        usize::from(self.j1.is_some()) + usize::from(self.j2.is_some())
    }
}

impl std::fmt::Display for Insertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fmt_item = |j: Option<ItemId>| j.map_or("-".to_string(), |j| j.to_string());
        write!(
            f,
            "j1={} j2={} df={} x1={} y2={} x3={} x1_max={} y2_max={} z1={:?} z2={:?}",
            fmt_item(self.j1),
            fmt_item(self.j2),
            self.df,
            self.x1,
            self.y2,
            self.x3,
            self.x1_max,
            self.y2_max,
            self.z1,
            self.z2
        )
    }
}

/// Per-depth generation context: where new content starts and which open
/// boundaries constrain it. `x1_curr`/`y2_curr` are `None` when the move
/// opens a fresh cut at that depth.
#[derive(Debug, Clone, Copy)]
struct DfCtx {
    df: Depth,
    plate: PlateId,
    x: Length,
    y: Length,
    band_left: Length,
    x1_curr: Option<Length>,
    y2_curr: Option<Length>,
    x1_cap: Length,
    y2_cap: Length,
}

/// Rule for the space between the new content's top and the 2-cut boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopRule {
    /// Waste above the content must be absent or at least `min_waste` tall.
    Spaced,
    /// The boundary must sit exactly on the content (two-item 4-cut).
    Flush,
    /// The content rises with the boundary (pinned item, defect waste).
    Floating,
}

const DEPTHS: [Depth; 4] = [2, 1, 0, -1];

impl<'a> Solution<'a> {
    /// Every legal insertion from the current state, in a deterministic
    /// order. With `break_symmetries`, moves that are geometrically
    /// equivalent to another enumerated move are suppressed.
    pub fn all_valid_insertions(&self, params: &Params, break_symmetries: bool) -> Vec<Insertion> {
        let instance = self.instance();
        let mut res = Vec::new();

        for s in 0..instance.stack_number() {
            let stack = instance.stack(StackId(s));
            let pos = self.pos_stack()[s];
            if pos >= stack.len() {
                continue;
            }
            let j1 = stack[pos];
            self.insertions_for_item(&mut res, j1, params, break_symmetries);
            if pos + 1 < stack.len() {
                self.insertions_for_pair(&mut res, j1, stack[pos + 1], params, break_symmetries);
            }
            for s2 in 0..instance.stack_number() {
                if s2 == s {
                    continue;
                }
                let stack2 = instance.stack(StackId(s2));
                let pos2 = self.pos_stack()[s2];
                if pos2 < stack2.len() {
                    self.insertions_for_pair(&mut res, j1, stack2[pos2], params, break_symmetries);
                }
            }
        }

        // Forced boundary moves that jump an open cut over a defect.
        for df in DEPTHS {
            if !self.df_allowed(df, params, break_symmetries) {
                continue;
            }
            let ctx = self.df_ctx(df);
            for d in instance.defects(ctx.plate) {
                if let Some(i) = self.insertion_defect(d, &ctx, params)
                    && !res.contains(&i)
                {
                    res.push(i);
                }
            }
        }
        res
    }

    /// Single-item insertions for `j` at every admissible depth, deepest
    /// first. A move that fits without growing the open boundaries makes
    /// every shallower context dominated; a move that fits anywhere makes
    /// opening a new plate dominated.
    fn insertions_for_item(
        &self,
        res: &mut Vec<Insertion>,
        j: ItemId,
        params: &Params,
        break_symmetries: bool,
    ) {
        let mut placed_deeper = false;
        for df in DEPTHS {
            if !self.df_allowed(df, params, break_symmetries) {
                continue;
            }
            if df == -1 && placed_deeper {
                continue;
            }
            let ctx = self.df_ctx(df);
            let mut no_increase = false;
            for o in self.orientations(j, break_symmetries) {
                if let Some(i) = self.insertion_1_item(j, o, &ctx, params) {
                    no_increase |=
                        ctx.x1_curr == Some(i.x1) && ctx.y2_curr == Some(i.y2);
                    placed_deeper = true;
                    res.push(i);
                }
            }
            if no_increase {
                break;
            }
        }
    }

    fn insertions_for_pair(
        &self,
        res: &mut Vec<Insertion>,
        j1: ItemId,
        j2: ItemId,
        params: &Params,
        break_symmetries: bool,
    ) {
        for df in DEPTHS {
            if !self.df_allowed(df, params, break_symmetries) {
                continue;
            }
            let ctx = self.df_ctx(df);
            for o1 in self.orientations(j1, break_symmetries) {
                for o2 in self.orientations(j2, break_symmetries) {
                    if let Some(i) = self.insertion_2_items(j1, o1, j2, o2, &ctx, params) {
                        res.push(i);
                    }
                }
            }
        }
    }

    /// Places `j` at the bottom of the band; falls back to the above-defect
    /// variant when the natural rectangle covers a defect.
    fn insertion_1_item(
        &self,
        j: ItemId,
        o: Orientation,
        ctx: &DfCtx,
        params: &Params,
    ) -> Option<Insertion> {
        let instance = self.instance();
        let (w, h) = instance.item(j).extent(o);
        let x3 = ctx.x + w;
        let top = ctx.y + h;
        if x3 > instance.plate_length() || top > instance.plate_width() {
            return None;
        }
        if geometry::rect_intersects_defects(instance, ctx.x, x3, ctx.y, top, ctx.plate).is_some()
        {
            return self.insertion_1_item_above_defect(j, o, ctx, params);
        }
        let mut i = Insertion {
            j1: Some(j),
            j2: None,
            o1: o,
            o2: o,
            anchor: Anchor::Bottom,
            df: ctx.df,
            x1: 0,
            y2: 0,
            x3,
            x1_max: 0,
            y2_max: 0,
            z1: XGrowth::MinWaste,
            z2: YGrowth::MinWaste,
        };
        self.settle(ctx, params, top, TopRule::Spaced, None, false, &mut i)
            .then_some(i)
    }

    /// Places `j` in a 4-cut opened over the defect(s) blocking its natural
    /// position. The waste piece below must be at least `min_waste` tall,
    /// and the item stays pinned to the band's top boundary.
    fn insertion_1_item_above_defect(
        &self,
        j: ItemId,
        o: Orientation,
        ctx: &DfCtx,
        params: &Params,
    ) -> Option<Insertion> {
        let instance = self.instance();
        let (w, h) = instance.item(j).extent(o);
        let x3 = ctx.x + w;
        let mut bottom = ctx.y + params.min_waste;
        while let Some(k) = geometry::rect_intersects_defects(
            instance,
            ctx.x,
            x3,
            bottom,
            bottom + h,
            ctx.plate,
        ) {
            bottom = instance.defect(k).rect.top;
        }
        if bottom + h > instance.plate_width() {
            return None;
        }
        let mut i = Insertion {
            j1: Some(j),
            j2: None,
            o1: o,
            o2: o,
            anchor: Anchor::Top,
            df: ctx.df,
            x1: 0,
            y2: 0,
            x3,
            x1_max: 0,
            y2_max: 0,
            z1: XGrowth::MinWaste,
            z2: YGrowth::MinWaste,
        };
        self.settle(
            ctx,
            params,
            bottom + h,
            TopRule::Floating,
            Some((w, h)),
            false,
            &mut i,
        )
        .then_some(i)
    }

    /// Places `j1` below `j2` in one 3-cut, separated by a 4-cut. Both
    /// items must share a width and fill their band exactly.
    fn insertion_2_items(
        &self,
        j1: ItemId,
        o1: Orientation,
        j2: ItemId,
        o2: Orientation,
        ctx: &DfCtx,
        params: &Params,
    ) -> Option<Insertion> {
        let instance = self.instance();
        let (w1, h1) = instance.item(j1).extent(o1);
        let (w2, h2) = instance.item(j2).extent(o2);
        if w1 != w2 {
            return None;
        }
        let x3 = ctx.x + w1;
        let top = ctx.y + h1 + h2;
        if x3 > instance.plate_length() || top > instance.plate_width() {
            return None;
        }
        let split = ctx.y + h1;
        if geometry::rect_intersects_defects(instance, ctx.x, x3, ctx.y, split, ctx.plate)
            .is_some()
            || geometry::rect_intersects_defects(instance, ctx.x, x3, split, top, ctx.plate)
                .is_some()
        {
            return None;
        }
        let mut i = Insertion {
            j1: Some(j1),
            j2: Some(j2),
            o1,
            o2,
            anchor: Anchor::Bottom,
            df: ctx.df,
            x1: 0,
            y2: 0,
            x3,
            x1_max: 0,
            y2_max: 0,
            z1: XGrowth::MinWaste,
            z2: YGrowth::MinWaste,
        };
        self.settle(ctx, params, top, TopRule::Flush, None, false, &mut i)
            .then_some(i)
    }

    /// Jumps the open cut over `d` without placing an item: the new 3-cut
    /// is waste covering the defect.
    fn insertion_defect(&self, d: &Defect, ctx: &DfCtx, params: &Params) -> Option<Insertion> {
        let instance = self.instance();
        let r = d.rect;
        if r.right <= ctx.x || r.top <= ctx.y {
            return None;
        }
        if ctx.df == 2 && r.bottom >= self.y2_curr() {
            return None;
        }
        let x3 = r.right.max(ctx.x + params.min_waste);
        let content_top = r.top.max(ctx.y + params.min_waste);
        if x3 > instance.plate_length() || content_top > instance.plate_width() {
            return None;
        }
        let mut i = Insertion {
            j1: None,
            j2: None,
            o1: Orientation::Default,
            o2: Orientation::Default,
            anchor: Anchor::Bottom,
            df: ctx.df,
            x1: 0,
            y2: 0,
            x3,
            x1_max: 0,
            y2_max: 0,
            z1: XGrowth::MinWaste,
            z2: YGrowth::MinWaste,
        };
        self.settle(ctx, params, content_top, TopRule::Floating, None, true, &mut i)
            .then_some(i)
    }

    /// Resolves `x1`, `y2` (and, for movable waste, `x3`) to the smallest
    /// values satisfying the minimum-waste rules, the open-boundary growth
    /// rules, and defect avoidance for every cut line involved, then
    /// derives the growth flags and the defect slack bounds. Returns false
    /// when no such values exist.
    #[allow(clippy::too_many_arguments)]
    fn settle(
        &self,
        ctx: &DfCtx,
        params: &Params,
        content_top: Length,
        rule: TopRule,
        new_float: Option<(Length, Length)>,
        x3_movable: bool,
        i: &mut Insertion,
    ) -> bool {
        let instance = self.instance();
        let plate_length = instance.plate_length();
        let plate_width = instance.plate_width();
        let mw = params.min_waste;
        let p = ctx.plate;

        let mut x3 = i.x3;
        let mut x1 = x3;
        let mut y2 = content_top;

        'fix: loop {
            // Boundary raise rules, applied to a local fixpoint. Every
            // branch only ever raises a coordinate, so this terminates.
            loop {
                let mut changed = false;
                if y2 < content_top {
                    y2 = content_top;
                    changed = true;
                }
                if rule == TopRule::Spaced && y2 > content_top && y2 - content_top < mw {
                    y2 = content_top + mw;
                    changed = true;
                }
                if rule == TopRule::Flush && y2 > content_top {
                    return false;
                }
                if let Some(c) = ctx.y2_curr {
                    if y2 < c {
                        y2 = c;
                        changed = true;
                    } else if y2 > c {
                        match self.z2() {
                            YGrowth::Frozen => return false,
                            YGrowth::MinWaste => {
                                if y2 - c < mw {
                                    y2 = c + mw;
                                    changed = true;
                                }
                            }
                            YGrowth::Free => {}
                        }
                    }
                }
                if x1 < x3 {
                    x1 = x3;
                    changed = true;
                }
                if x1 > x3 && x1 - x3 < mw {
                    x1 = x3 + mw;
                    changed = true;
                }
                if let Some(c) = ctx.x1_curr {
                    if x1 < c {
                        x1 = c;
                        changed = true;
                    } else if x1 > c && self.z1() == XGrowth::MinWaste && x1 - c < mw {
                        x1 = c + mw;
                        changed = true;
                    }
                }
                if !changed {
                    break;
                }
            }
            if y2 > plate_width || y2 > ctx.y2_cap {
                return false;
            }
            if x1 > plate_length || x1 > ctx.x1_cap {
                return false;
            }

            // Cut lines must not cross a defect interior. Pushing a
            // coordinate restarts the raise rules above.
            if let Some(k) = geometry::x_intersects_defect(instance, x1, p) {
                x1 = instance.defect(k).rect.right;
                continue 'fix;
            }
            if let Some(k) = geometry::y_intersects_defect(instance, ctx.band_left, x1, y2, p) {
                y2 = instance.defect(k).rect.top;
                continue 'fix;
            }
            if let Some(k) = geometry::x_span_intersects_defect(instance, x3, ctx.y, y2, p) {
                if !x3_movable {
                    return false;
                }
                x3 = instance.defect(k).rect.right;
                continue 'fix;
            }

            // Items pinned above defects slide up with the boundary.
            if let Some(c) = ctx.y2_curr
                && y2 > c
            {
                for f in self.floating() {
                    let (fw, fh) = instance.item(f.item).extent(f.orientation);
                    if let Some(k) = geometry::rect_intersects_defects(
                        instance,
                        f.x - fw,
                        f.x,
                        y2 - fh,
                        y2,
                        p,
                    ) {
                        y2 = instance.defect(k).rect.top + fh;
                        continue 'fix;
                    }
                }
            }
            if let Some((fw, fh)) = new_float
                && y2 > content_top
                && let Some(k) =
                    geometry::rect_intersects_defects(instance, x3 - fw, x3, y2 - fh, y2, p)
            {
                y2 = instance.defect(k).rect.top + fh;
                continue 'fix;
            }
            break;
        }

        i.x1 = x1;
        i.y2 = y2;
        i.x3 = x3;

        // Growth flags: a flush band pins the boundary to the min-waste
        // step; an unchanged boundary keeps its previous restriction.
        let cand1 = if x1 == x3 { XGrowth::MinWaste } else { XGrowth::Free };
        i.z1 = match ctx.x1_curr {
            Some(c) if x1 == c => XGrowth::most_restrictive(cand1, self.z1()),
            _ => cand1,
        };
        let cand2 = match rule {
            TopRule::Flush => YGrowth::Frozen,
            TopRule::Floating => YGrowth::Free,
            TopRule::Spaced => {
                if y2 == content_top {
                    YGrowth::MinWaste
                } else {
                    YGrowth::Free
                }
            }
        };
        i.z2 = match ctx.y2_curr {
            Some(c) if y2 == c => YGrowth::most_restrictive(cand2, self.z2()),
            _ => cand2,
        };

        // Remaining slack before a recorded cut line would hit a defect.
        let mut x1_max = ctx.x1_cap.min(plate_length);
        let mut y2_max = ctx.y2_cap.min(plate_width);
        for d in instance.defects(p) {
            let r = d.rect;
            if r.bottom < y2 && y2 < r.top && r.left >= x1 {
                x1_max = x1_max.min(r.left);
            }
            if r.left < x3 && x3 < r.right && r.bottom >= y2 {
                y2_max = y2_max.min(r.bottom);
            }
        }
        i.x1_max = x1_max;
        i.y2_max = if i.z2 == YGrowth::Frozen { y2 } else { y2_max };
        true
    }

    fn df_allowed(&self, df: Depth, params: &Params, break_symmetries: bool) -> bool {
        df >= self.df_min()
            && self.depth_available(df)
            && self.closing_ok(df, params)
            && (!break_symmetries || self.symmetry_ok(df))
    }

    fn depth_available(&self, df: Depth) -> bool {
        match df {
            -1 => self.plate_number() < self.instance().plate_count(),
            0 => self.plate_number() > 0,
            1 => self.curr_cut(1).is_some(),
            2 => self.curr_cut(2).is_some(),
            _ => false,
        }
    }

    /// Closing a cut leaves a residual piece that must itself be legal
    /// waste: absent, or at least `min_waste` across.
    fn closing_ok(&self, df: Depth, params: &Params) -> bool {
        if self.plate_number() == 0 {
            return true;
        }
        if df <= 0 {
            let residual = self.instance().plate_width() - self.y2_curr();
            if residual != 0 && residual < params.min_waste {
                return false;
            }
        }
        if df == -1 {
            let residual = self.instance().plate_length() - self.x1_curr();
            if residual != 0 && residual < params.min_waste {
                return false;
            }
        }
        true
    }

    /// Closing an item-empty group and opening a fresh sibling is the same
    /// plan with the two groups swapped; keep only one representative.
    /// Groups forced by a defect bypass are exempt.
    fn symmetry_ok(&self, df: Depth) -> bool {
        if df == -1
            && self.plate_number() > 0
            && self.plate_items() == 0
            && !self.plate_defect_jumped()
        {
            return false;
        }
        for depth in (df + 1).max(1)..=3 {
            if let Some(g) = self.curr_cut(depth as u8)
                && g.item_count == 0
                && !g.defect_forced
            {
                return false;
            }
        }
        true
    }

    fn orientations(&self, j: ItemId, break_symmetries: bool) -> Vec<Orientation> {
        if break_symmetries && self.instance().item(j).is_square() {
            vec![Orientation::Default]
        } else {
            vec![Orientation::Default, Orientation::Rotated]
        }
    }

    fn df_ctx(&self, df: Depth) -> DfCtx {
        let instance = self.instance();
        match df {
            -1 => DfCtx {
                df,
                plate: PlateId(self.plate_number()),
                x: 0,
                y: 0,
                band_left: 0,
                x1_curr: None,
                y2_curr: None,
                x1_cap: instance.plate_length(),
                y2_cap: instance.plate_width(),
            },
            0 => DfCtx {
                df,
                plate: PlateId(self.plate_number() - 1),
                x: self.x1_curr(),
                y: 0,
                band_left: self.x1_curr(),
                x1_curr: None,
                y2_curr: None,
                x1_cap: instance.plate_length(),
                y2_cap: instance.plate_width(),
            },
            1 => DfCtx {
                df,
                plate: PlateId(self.plate_number() - 1),
                x: self.x1_prev(),
                y: self.y2_curr(),
                band_left: self.x1_prev(),
                x1_curr: Some(self.x1_curr()),
                y2_curr: None,
                x1_cap: self.x1_max(),
                y2_cap: instance.plate_width(),
            },
            2 => DfCtx {
                df,
                plate: PlateId(self.plate_number() - 1),
                x: self.x3_curr(),
                y: self.y2_prev(),
                band_left: self.x1_prev(),
                x1_curr: Some(self.x1_curr()),
                y2_curr: Some(self.y2_curr()),
                x1_cap: self.x1_max(),
                y2_cap: self.y2_max(),
            },
            _ => panic!("invalid insertion depth {df}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_support::instance;
    use crate::solution::Solution;

    fn params() -> Params {
        Params::default()
    }

    #[test]
    fn test_trivial_fit_offers_both_orientations() {
        let ins = instance((100, 100), 1, &[&[(30, 20)]], &[]);
        let sol = Solution::new(&ins);
        let moves = sol.all_valid_insertions(&params(), true);
        assert!(moves.iter().any(|i| i.x1 == 30 && i.y2 == 20));
        assert!(moves.iter().any(|i| i.x1 == 20 && i.y2 == 30));
    }

    #[test]
    fn test_determinism() {
        let ins = instance(
            (100, 100),
            2,
            &[&[(30, 20), (25, 25)], &[(40, 35)]],
            &[(0, 60, 0, 10, 100)],
        );
        let mut sol = Solution::new(&ins);
        let first = sol.all_valid_insertions(&params(), true);
        assert_eq!(first, sol.all_valid_insertions(&params(), true));
        sol.add_item(&first[0]);
        let second = sol.all_valid_insertions(&params(), true);
        assert_eq!(second, sol.all_valid_insertions(&params(), true));
    }

    #[test]
    fn test_stack_order_enforced() {
        let ins = instance((100, 100), 1, &[&[(30, 20), (40, 40)]], &[]);
        let sol = Solution::new(&ins);
        let moves = sol.all_valid_insertions(&params(), true);
        // Rank 1 may only ever appear together with rank 0.
        for i in &moves {
            if i.j1 == Some(ItemId(1)) {
                panic!("rank-1 item offered before rank 0");
            }
            if i.j2 == Some(ItemId(1)) {
                assert_eq!(i.j1, Some(ItemId(0)));
            }
        }
    }

    #[test]
    fn test_defect_blocks_straddling_item() {
        // Full-height defect over x in [10, 20].
        let ins = instance((100, 100), 1, &[&[(15, 10)]], &[(0, 10, 0, 10, 100)]);
        let sol = Solution::new(&ins);
        let moves = sol.all_valid_insertions(&params(), true);
        assert!(
            moves.iter().all(|i| i.j1.is_none()),
            "straddling item must not be placeable"
        );
    }

    #[test]
    fn test_defect_caps_x1_max() {
        let ins = instance((100, 100), 1, &[&[(10, 10)]], &[(0, 10, 0, 10, 100)]);
        let mut sol = Solution::new(&ins);
        let moves = sol.all_valid_insertions(&params(), true);
        let placed = moves
            .iter()
            .find(|i| i.j1 == Some(ItemId(0)) && i.o1 == Orientation::Default)
            .expect("flush item fits");
        assert_eq!(placed.x1, 10);
        assert_eq!(placed.x1_max, 10);
        sol.add_item(placed);
        assert_eq!(sol.x1_max(), 10);
    }

    #[test]
    fn test_widen_open_cut_for_second_item() {
        let ins = instance((200, 110), 1, &[&[(50, 90), (40, 90)]], &[]);
        let p = params();
        let mut sol = Solution::new(&ins);
        let first = sol
            .all_valid_insertions(&p, true)
            .into_iter()
            .find(|i| i.x1 == 50 && i.y2 == 90)
            .unwrap();
        sol.add_item(&first);
        assert_eq!(sol.z1(), XGrowth::MinWaste);

        // The second item continues the open 2-cut, widening the 1-cut
        // from 50 to 90 (40 >= min_waste, legal even from a flush band).
        let moves = sol.all_valid_insertions(&p, true);
        let second = moves
            .iter()
            .find(|i| i.j1 == Some(ItemId(1)) && i.o1 == Orientation::Default)
            .unwrap();
        assert_eq!(second.df, 2);
        assert_eq!(second.x3, 90);
        assert_eq!(second.x1, 90);
        assert_eq!(second.y2, 90);
    }

    #[test]
    fn test_widening_below_min_waste_pushes_boundary() {
        // First item closes a band flush at x1=50; the second, 8mm longer,
        // would widen the 1-cut by less than the minimum waste, so the
        // boundary jumps to x3 + min_waste.
        let ins = instance((200, 200), 1, &[&[(50, 90)], &[(58, 80)]], &[]);
        let p = params();
        let mut sol = Solution::new(&ins);
        let first = sol
            .all_valid_insertions(&p, true)
            .into_iter()
            .find(|i| i.j1 == Some(ItemId(0)) && i.x1 == 50 && i.y2 == 90)
            .unwrap();
        sol.add_item(&first);

        let second = sol
            .all_valid_insertions(&p, true)
            .into_iter()
            .find(|i| i.j1 == Some(ItemId(1)) && i.df == 1 && i.o1 == Orientation::Default)
            .unwrap();
        assert_eq!(second.x3, 58);
        // 58 - 50 = 8 < 20, so x1 = 58 + 20.
        assert_eq!(second.x1, 78);
        assert_eq!(second.z1, XGrowth::Free);
    }

    #[test]
    fn test_two_item_insertion_freezes_band() {
        let ins = instance((100, 100), 1, &[&[(30, 40), (30, 50)]], &[]);
        let p = params();
        let sol = Solution::new(&ins);
        let pair = sol
            .all_valid_insertions(&p, true)
            .into_iter()
            .find(|i| i.j2.is_some())
            .expect("equal-width pair offered");
        assert_eq!(pair.j1, Some(ItemId(0)));
        assert_eq!(pair.j2, Some(ItemId(1)));
        assert_eq!(pair.y2, 90);
        assert_eq!(pair.z2, YGrowth::Frozen);
        assert_eq!(pair.y2_max, 90);

        let mut sol = sol;
        sol.add_item(&pair);
        assert_eq!(sol.item_number(), 2);
        assert_eq!(sol.z2(), YGrowth::Frozen);
        assert_eq!(sol.waste() + sol.item_area(), sol.area());
    }

    #[test]
    fn test_defect_jump_generated_and_item_above_defect() {
        // Defect low in the plate: the cut can jump it, or the item sits
        // above it in a 4-cut.
        let ins = instance((100, 100), 1, &[&[(30, 30)]], &[(0, 0, 10, 20, 10)]);
        let p = params();
        let sol = Solution::new(&ins);
        let moves = sol.all_valid_insertions(&p, true);

        let jump = moves.iter().find(|i| i.j1.is_none()).expect("defect jump");
        assert_eq!(jump.x3, 20);
        assert_eq!(jump.y2, 20);

        let above = moves
            .iter()
            .find(|i| i.j1 == Some(ItemId(0)) && i.anchor == Anchor::Top)
            .expect("item above defect");
        // Waste below the item covers the defect: at least 20 tall.
        assert_eq!(above.y2, 20 + 30);
        assert_eq!(above.z2, YGrowth::Free);
    }

    #[test]
    fn test_above_defect_rejected_when_cut_would_split_defect() {
        // The defect reaches x=40: a 3-cut at the item's right edge (30)
        // would cut through it, so no above-defect placement exists.
        let ins = instance((100, 100), 1, &[&[(30, 30)]], &[(0, 0, 10, 40, 10)]);
        let p = params();
        let sol = Solution::new(&ins);
        let moves = sol.all_valid_insertions(&p, true);
        assert!(moves.iter().all(|i| i.j1.is_none()));
        // The defect jump clears past the defect's right edge.
        let jump = moves.iter().find(|i| i.j1.is_none()).expect("defect jump");
        assert_eq!(jump.x3, 40);
    }

    #[test]
    fn test_new_plate_suppressed_when_item_fits() {
        let ins = instance((100, 100), 2, &[&[(30, 20), (30, 20)]], &[]);
        let p = params();
        let mut sol = Solution::new(&ins);
        let first = sol.all_valid_insertions(&p, true)[0];
        sol.add_item(&first);
        // The second item fits next to the first; opening plate 1 for it
        // would be dominated, so no candidate proposes it.
        let moves = sol.all_valid_insertions(&p, true);
        assert!(moves.iter().any(|i| i.df == 2));
        assert!(moves.iter().all(|i| i.df != -1));
    }

    #[test]
    fn test_new_plate_offered_when_nothing_fits() {
        let ins = instance((100, 100), 2, &[&[(100, 100), (100, 100)]], &[]);
        let p = params();
        let mut sol = Solution::new(&ins);
        let first = sol.all_valid_insertions(&p, true)[0];
        sol.add_item(&first);
        // Plate 0 is full: the only way forward is plate 1.
        let moves = sol.all_valid_insertions(&p, true);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|i| i.df == -1));
    }

    #[test]
    fn test_square_item_single_orientation() {
        let ins = instance((100, 100), 1, &[&[(30, 30)]], &[]);
        let p = params();
        let sol = Solution::new(&ins);
        let with_sym = sol.all_valid_insertions(&p, true);
        let without_sym = sol.all_valid_insertions(&p, false);
        assert_eq!(with_sym.len(), 1);
        assert_eq!(without_sym.len(), 2);
    }

    #[test]
    fn test_dead_end_returns_empty() {
        // Single plate already holding the only item: nothing left.
        let ins = instance((100, 100), 1, &[&[(100, 100)]], &[]);
        let p = params();
        let mut sol = Solution::new(&ins);
        let only = sol.all_valid_insertions(&p, true)[0];
        sol.add_item(&only);
        assert!(sol.is_complete());
        assert!(sol.all_valid_insertions(&p, true).is_empty());
    }
}
