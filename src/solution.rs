//! Partial cutting-plan representation: an append-only arena of cut nodes,
//! the per-item placement table, per-stack cursors, and the four-level
//! cut-front state updated on every commit.
//!
//! A `Solution` is a self-contained snapshot of one search branch. Forking
//! a branch is a plain `clone()`; nothing is ever removed from the arena.

use crate::insertion::Insertion;
use crate::instance::Instance;
use crate::types::{Anchor, Area, Depth, ItemId, Length, NodeId, Orientation, PlateId, Rect};

/// Owner of a cut node: 1-cuts sit directly on a plate, deeper cuts under
/// their father node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Father {
    Plate(PlateId),
    Node(NodeId),
}

/// One node of the guillotine cut tree. `pos` is the x-position of the cut
/// for 1-cuts and 3-cuts, the y-position for 2-cuts. The position of the
/// still-open cut at each depth may move outward until the cut closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutNode {
    pub father: Father,
    pub depth: u8,
    pub pos: Length,
}

/// One placed item. Two items may share a node (a two-item 4-cut).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedItem {
    pub item: ItemId,
    pub node: NodeId,
    pub orientation: Orientation,
    pub anchor: Anchor,
}

/// Summary of one open or closed cut group at a given depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutGroup {
    pub node: NodeId,
    pub item_count: usize,
    pub bbox: Rect,
    /// Created or extended by a defect bypass; exempt from empty-group
    /// symmetry suppression.
    pub defect_forced: bool,
}

/// Growth latitude of the open 1-cut's right boundary.
///
/// `MinWaste`: some band is flush against the boundary, so widening must
/// add at least the minimum waste. `Free`: every band already ends at
/// least the minimum waste short of the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XGrowth {
    MinWaste,
    Free,
}

impl XGrowth {
    pub fn permissiveness(self) -> u8 {
        match self {
            XGrowth::MinWaste => 1,
            XGrowth::Free => 2,
        }
    }

    pub(crate) fn most_restrictive(a: XGrowth, b: XGrowth) -> XGrowth {
        if a.permissiveness() <= b.permissiveness() { a } else { b }
    }
}

/// Growth latitude of the open 2-cut's top boundary. `Frozen` marks a band
/// containing a closed two-item 4-cut, whose height can no longer change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YGrowth {
    Frozen,
    MinWaste,
    Free,
}

impl YGrowth {
    pub fn permissiveness(self) -> u8 {
        match self {
            YGrowth::Frozen => 0,
            YGrowth::MinWaste => 1,
            YGrowth::Free => 2,
        }
    }

    pub(crate) fn most_restrictive(a: YGrowth, b: YGrowth) -> YGrowth {
        if a.permissiveness() <= b.permissiveness() { a } else { b }
    }
}

/// An item placed above a defect in the currently open 2-cut. Such items
/// stay flush against the band's top boundary, so whenever the boundary
/// rises they slide up and must be re-validated against the defects.
/// `x` is the item's right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingItem {
    pub item: ItemId,
    pub orientation: Orientation,
    pub x: Length,
}

#[derive(Debug, Clone)]
pub struct Solution<'a> {
    instance: &'a Instance,
    nodes: Vec<CutNode>,
    items: Vec<PlacedItem>,
    pos_stack: Vec<usize>,
    plate_number: usize,
    plate_items: usize,
    plate_defect_jumped: bool,
    item_area: Area,
    current_area: Area,
    waste: Area,
    curr_cut: [Option<CutGroup>; 4],
    prev_cut: [Option<CutGroup>; 4],
    x1_max: Length,
    y2_max: Length,
    z1: XGrowth,
    z2: YGrowth,
    df_min: Depth,
    floating: Vec<FloatingItem>,
}

impl<'a> Solution<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            nodes: Vec::new(),
            items: Vec::new(),
            pos_stack: vec![0; instance.stack_number()],
            plate_number: 0,
            plate_items: 0,
            plate_defect_jumped: false,
            item_area: 0,
            current_area: 0,
            waste: 0,
            curr_cut: [None; 4],
            prev_cut: [None; 4],
            x1_max: instance.plate_length(),
            y2_max: instance.plate_width(),
            z1: XGrowth::MinWaste,
            z2: YGrowth::MinWaste,
            df_min: -1,
            floating: Vec::new(),
        }
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub fn nodes(&self) -> &[CutNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &CutNode {
        &self.nodes[id.0]
    }

    pub fn node_number(&self) -> usize {
        self.nodes.len()
    }

    /// Plate a node belongs to, by walking father links.
    pub fn node_plate(&self, id: NodeId) -> PlateId {
        let mut node = &self.nodes[id.0];
        loop {
            match node.father {
                Father::Plate(p) => return p,
                Father::Node(f) => node = &self.nodes[f.0],
            }
        }
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn item_number(&self) -> usize {
        self.items.len()
    }

    /// Stack cursors: `pos_stack()[s] == k` iff the plan contains the first
    /// `k` items of stack `s`.
    pub fn pos_stack(&self) -> &[usize] {
        &self.pos_stack
    }

    pub fn plate_number(&self) -> usize {
        self.plate_number
    }

    /// The plate currently being filled, if any plate was opened yet.
    pub fn plate(&self) -> Option<PlateId> {
        if self.plate_number == 0 {
            None
        } else {
            Some(PlateId(self.plate_number - 1))
        }
    }

    pub(crate) fn plate_items(&self) -> usize {
        self.plate_items
    }

    pub(crate) fn plate_defect_jumped(&self) -> bool {
        self.plate_defect_jumped
    }

    pub fn item_area(&self) -> Area {
        self.item_area
    }

    /// Plate area consumed so far: full plates, the closed part of the
    /// current plate, and the current 2-cut up to its last 3-cut.
    pub fn area(&self) -> Area {
        self.current_area
    }

    pub fn waste(&self) -> Area {
        self.waste
    }

    pub fn curr_cut(&self, depth: u8) -> Option<&CutGroup> {
        self.curr_cut[depth as usize].as_ref()
    }

    pub fn prev_cut(&self, depth: u8) -> Option<&CutGroup> {
        self.prev_cut[depth as usize].as_ref()
    }

    pub fn x1_curr(&self) -> Length {
        self.curr_cut[1].map_or(0, |c| self.nodes[c.node.0].pos)
    }

    pub fn x1_prev(&self) -> Length {
        self.prev_cut[1].map_or(0, |c| self.nodes[c.node.0].pos)
    }

    pub fn y2_curr(&self) -> Length {
        self.curr_cut[2].map_or(0, |c| self.nodes[c.node.0].pos)
    }

    pub fn y2_prev(&self) -> Length {
        self.prev_cut[2].map_or(0, |c| self.nodes[c.node.0].pos)
    }

    pub fn x3_curr(&self) -> Length {
        self.curr_cut[3]
            .map_or_else(|| self.x1_prev(), |c| self.nodes[c.node.0].pos)
    }

    pub fn x3_prev(&self) -> Length {
        self.prev_cut[3]
            .map_or_else(|| self.x1_prev(), |c| self.nodes[c.node.0].pos)
    }

    pub fn x1_max(&self) -> Length {
        self.x1_max
    }

    pub fn y2_max(&self) -> Length {
        self.y2_max
    }

    pub fn z1(&self) -> XGrowth {
        self.z1
    }

    pub fn z2(&self) -> YGrowth {
        self.z2
    }

    /// Minimum admissible attach depth for the next insertion. Raised after
    /// a defect bypass so the jump is not immediately abandoned.
    pub fn df_min(&self) -> Depth {
        self.df_min
    }

    pub fn floating(&self) -> &[FloatingItem] {
        &self.floating
    }

    pub fn is_complete(&self) -> bool {
        self.item_number() == self.instance.item_number()
    }

    /// Waste relative to the total item surface of the instance.
    pub fn waste_percentage(&self) -> f64 {
        self.waste as f64 / self.instance.item_surface() as f64
    }

    pub fn percentage_items(&self) -> f64 {
        self.item_number() as f64 / self.instance.item_number() as f64
    }

    pub fn mean_area(&self) -> f64 {
        if self.item_number() == 0 {
            0.0
        } else {
            self.item_area as f64 / self.item_number() as f64
        }
    }

    pub fn remaining_area(&self) -> Area {
        self.instance.item_surface() - self.item_area
    }

    pub fn mean_remaining_area(&self) -> f64 {
        let remaining_items = self.instance.item_number() - self.item_number();
        if remaining_items == 0 {
            0.0
        } else {
            self.remaining_area() as f64 / remaining_items as f64
        }
    }

    /// Ratio of mean placed-item area to mean remaining-item area; the
    /// balance comparator ranks by its distance from 1.
    pub fn diff_percentage_means(&self) -> f64 {
        let remaining = self.mean_remaining_area();
        if remaining == 0.0 {
            0.0
        } else {
            (self.mean_area() / remaining).abs()
        }
    }

    /// Sum of length minus width over all placed items.
    pub fn diff_width(&self) -> Length {
        self.items
            .iter()
            .map(|p| {
                let item = self.instance.item(p.item);
                item.length - item.width
            })
            .sum()
    }

    /// Total plate width consumed, counting full plates before the current
    /// one and the current plate up to its last 1-cut.
    pub fn used_width(&self) -> Length {
        if self.plate_number == 0 {
            return 0;
        }
        (self.plate_number as Length - 1) * self.instance.plate_length() + self.x1_curr()
    }

    /// Final objective of a complete plan: consumed plate area, with the
    /// last plate counted up to its final 1-cut (the remainder is reusable
    /// leftover), minus the placed item area.
    pub fn final_waste(&self) -> Area {
        if self.plate_number == 0 {
            return 0;
        }
        (self.plate_number as Area - 1) * self.instance.plate_area()
            + self.x1_curr() * self.instance.plate_width()
            - self.item_area
    }

    /// Commits an insertion generated against this exact state and returns
    /// the id of the 3-cut node holding the new content. Committing a stale
    /// insertion is a contract violation.
    pub fn add_item(&mut self, ins: &Insertion) -> NodeId {
        assert!(ins.df >= self.df_min, "insertion below df_min");
        if ins.df == -1 {
            assert!(
                self.plate_number < self.instance.plate_count(),
                "no plate left to open"
            );
            self.plate_number += 1;
            self.plate_items = 0;
            self.plate_defect_jumped = false;
        }
        assert!(self.plate_number > 0, "insertion without an open plate");
        let plate = PlateId(self.plate_number - 1);
        let plate_width = self.instance.plate_width();

        self.update_prev_cuts_and_curr_cuts(ins.df);

        // Create the nodes of newly opened groups, extend still-open ones.
        let n1 = if ins.df <= 0 {
            self.push_node(Father::Plate(plate), 1, ins.x1)
        } else {
            let id = self.curr_cut[1].expect("open 1-cut").node;
            self.nodes[id.0].pos = ins.x1;
            id
        };
        let n2 = if ins.df <= 1 {
            self.push_node(Father::Node(n1), 2, ins.y2)
        } else {
            let id = self.curr_cut[2].expect("open 2-cut").node;
            self.nodes[id.0].pos = ins.y2;
            id
        };
        let n3 = self.push_node(Father::Node(n2), 3, ins.x3);

        let placed = usize::from(ins.j1.is_some()) + usize::from(ins.j2.is_some());
        let defect_forced = ins.j1.is_none();

        // Refresh the per-depth group summaries.
        if ins.df <= 0 {
            self.curr_cut[1] = Some(CutGroup {
                node: n1,
                item_count: placed,
                bbox: Rect::new(self.x1_prev(), 0, ins.x1, plate_width),
                defect_forced,
            });
        } else {
            let g = self.curr_cut[1].as_mut().expect("open 1-cut");
            g.item_count += placed;
            g.bbox.right = ins.x1;
            g.defect_forced |= defect_forced;
        }
        if ins.df <= 1 {
            self.curr_cut[2] = Some(CutGroup {
                node: n2,
                item_count: placed,
                bbox: Rect::new(self.x1_prev(), self.y2_prev(), ins.x1, ins.y2),
                defect_forced,
            });
        } else {
            let g = self.curr_cut[2].as_mut().expect("open 2-cut");
            g.item_count += placed;
            g.bbox.right = ins.x1;
            g.bbox.top = ins.y2;
            g.defect_forced |= defect_forced;
        }
        self.curr_cut[3] = Some(CutGroup {
            node: n3,
            item_count: placed,
            bbox: Rect::new(self.x3_prev(), self.y2_prev(), ins.x3, ins.y2),
            defect_forced,
        });

        // The open 2-cut closed: its pinned items are settled for good.
        if ins.df <= 1 {
            self.floating.clear();
        }

        if let Some(j1) = ins.j1 {
            let anchor = if ins.j2.is_some() { Anchor::Bottom } else { ins.anchor };
            self.place(j1, n3, ins.o1, anchor);
            if anchor == Anchor::Top {
                self.floating.push(FloatingItem {
                    item: j1,
                    orientation: ins.o1,
                    x: ins.x3,
                });
            }
        }
        if let Some(j2) = ins.j2 {
            self.place(j2, n3, ins.o2, Anchor::Top);
        }
        self.plate_items += placed;
        if defect_forced {
            self.plate_defect_jumped = true;
        }

        self.x1_max = ins.x1_max;
        self.y2_max = ins.y2_max;
        self.z1 = ins.z1;
        self.z2 = ins.z2;
        self.df_min = if defect_forced { ins.df } else { -1 };

        // Accounting: consumed area is derived from the new front, waste is
        // whatever of it items do not cover.
        self.current_area = (self.plate_number as Area - 1) * self.instance.plate_area()
            + self.x1_prev() * plate_width
            + (self.x1_curr() - self.x1_prev()) * self.y2_prev()
            + (self.x3_curr() - self.x1_prev()) * (self.y2_curr() - self.y2_prev());
        let waste = self.current_area - self.item_area;
        debug_assert!(waste >= self.waste, "consumed area regressed");
        self.waste = waste;

        tracing::trace!(
            df = ins.df,
            node = %n3,
            items = self.item_number(),
            waste = self.waste,
            "committed insertion"
        );
        n3
    }

    fn place(&mut self, j: ItemId, node: NodeId, orientation: Orientation, anchor: Anchor) {
        let item = self.instance.item(j);
        let cursor = &mut self.pos_stack[item.stack.0];
        assert_eq!(
            self.instance.stack(item.stack).get(*cursor),
            Some(&j),
            "item placed out of stack order"
        );
        *cursor += 1;
        self.items.push(PlacedItem {
            item: j,
            node,
            orientation,
            anchor,
        });
        self.item_area += item.area();
    }

    fn push_node(&mut self, father: Father, depth: u8, pos: Length) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(CutNode { father, depth, pos });
        id
    }

    /// Rotates the groups closed by an insertion at `df` into the `prev`
    /// slots. Deeper-than-`df+1` groups vanish: the new sibling group has
    /// no predecessor at those depths.
    fn update_prev_cuts_and_curr_cuts(&mut self, df: Depth) {
        match df {
            -1 => {
                self.prev_cut = [None; 4];
                self.curr_cut = [None; 4];
            }
            0 => {
                self.prev_cut[1] = self.curr_cut[1].take();
                self.prev_cut[2] = None;
                self.prev_cut[3] = None;
                self.curr_cut[2] = None;
                self.curr_cut[3] = None;
            }
            1 => {
                self.prev_cut[2] = self.curr_cut[2].take();
                self.prev_cut[3] = None;
                self.curr_cut[3] = None;
            }
            2 => {
                self.prev_cut[3] = self.curr_cut[3].take();
            }
            _ => panic!("invalid insertion depth {df}"),
        }
    }
}
