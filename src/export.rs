//! Read-only projections of a solution: the flattened node list consumed
//! by exporters, a CSV rendition of it, and the validation sweeps the
//! tests use to audit committed plans.

use crate::geometry;
use crate::solution::{Father, Solution};
use crate::types::{Anchor, DefectId, ItemId, NodeId, Orientation, PlateId, Rect};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PlanItem {
    pub item: ItemId,
    pub orientation: Orientation,
    pub rect: Rect,
}

/// One flattened cut node: its arena identity, derived placement on the
/// plate, child list, and any items it holds.
#[derive(Debug, Clone, Serialize)]
pub struct PlanNode {
    pub id: NodeId,
    pub father: Option<NodeId>,
    pub depth: u8,
    pub plate: PlateId,
    pub rect: Rect,
    pub children: Vec<NodeId>,
    pub items: Vec<PlanItem>,
}

impl<'a> Solution<'a> {
    /// Flattens the arena into displayable nodes. Boxes are derived from
    /// each node's cut position and its preceding sibling; arena order
    /// guarantees fathers and siblings are resolved before their
    /// dependents.
    pub fn plan_nodes(&self) -> Vec<PlanNode> {
        let instance = self.instance();
        let mut res: Vec<PlanNode> = Vec::with_capacity(self.node_number());

        for (idx, node) in self.nodes().iter().enumerate() {
            let id = NodeId(idx);
            let plate = self.node_plate(id);
            let father = match node.father {
                Father::Plate(_) => None,
                Father::Node(f) => Some(f),
            };
            let prev = res
                .iter()
                .rev()
                .find(|n| n.father == father && n.depth == node.depth && n.plate == plate);
            let rect = match node.depth {
                1 => {
                    let start = prev.map_or(0, |n| n.rect.right);
                    Rect::new(start, 0, node.pos, instance.plate_width())
                }
                2 => {
                    let f = &res[father.expect("2-cut has a father").0];
                    let start = prev.map_or(f.rect.bottom, |n| n.rect.top);
                    Rect::new(f.rect.left, start, f.rect.right, node.pos)
                }
                3 => {
                    let f = &res[father.expect("3-cut has a father").0];
                    let start = prev.map_or(f.rect.left, |n| n.rect.right);
                    Rect::new(start, f.rect.bottom, node.pos, f.rect.top)
                }
                d => panic!("unexpected node depth {d}"),
            };

            let items = self
                .items()
                .iter()
                .filter(|p| p.node == id)
                .map(|p| {
                    let (w, h) = instance.item(p.item).extent(p.orientation);
                    let item_rect = match p.anchor {
                        Anchor::Bottom => {
                            Rect::new(rect.left, rect.bottom, rect.left + w, rect.bottom + h)
                        }
                        Anchor::Top => Rect::new(rect.left, rect.top - h, rect.left + w, rect.top),
                    };
                    PlanItem {
                        item: p.item,
                        orientation: p.orientation,
                        rect: item_rect,
                    }
                })
                .collect();

            res.push(PlanNode {
                id,
                father,
                depth: node.depth,
                plate,
                rect,
                children: Vec::new(),
                items,
            });
        }

        for idx in 0..res.len() {
            if let Some(f) = res[idx].father {
                let id = res[idx].id;
                res[f.0].children.push(id);
            }
        }
        res
    }

    /// First placed item overlapping a defect, if the plan is unsound.
    pub fn check_defect_intersections(&self) -> Option<DefectId> {
        let instance = self.instance();
        for node in self.plan_nodes() {
            for item in &node.items {
                let r = item.rect;
                if let Some(k) = geometry::rect_intersects_defects(
                    instance, r.left, r.right, r.bottom, r.top, node.plate,
                ) {
                    return Some(k);
                }
            }
        }
        None
    }

    /// True when no two placed items overlap.
    pub fn check_item_overlaps(&self) -> bool {
        let mut rects: Vec<(PlateId, Rect)> = Vec::new();
        for node in self.plan_nodes() {
            for item in &node.items {
                rects.push((node.plate, item.rect));
            }
        }
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                if rects[i].0 == rects[j].0 && rects[i].1.overlaps(&rects[j].1) {
                    return false;
                }
            }
        }
        true
    }
}

/// One CSV row per node; nodes holding items repeat their fields per item,
/// waste nodes leave the item columns empty.
pub fn to_csv(nodes: &[PlanNode]) -> String {
    let mut out = String::from("id;father;depth;plate;left;bottom;right;top;item;orientation\n");
    for n in nodes {
        let father = n.father.map(|f| f.to_string()).unwrap_or_default();
        let prefix = format!(
            "{};{};{};{};{};{};{};{}",
            n.id, father, n.depth, n.plate, n.rect.left, n.rect.bottom, n.rect.right, n.rect.top
        );
        if n.items.is_empty() {
            out.push_str(&prefix);
            out.push_str(";;\n");
        } else {
            for item in &n.items {
                out.push_str(&prefix);
                out.push_str(&format!(";{};{}\n", item.item, item.orientation));
            }
        }
    }
    out
}
