use crate::types::{Area, DefectId, ItemId, Length, Orientation, PlateId, Rect, StackId};
use serde::{Deserialize, Serialize};

/// One rectangular piece to cut. `length` runs along x in the default
/// orientation, `width` along y.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    pub id: ItemId,
    pub length: Length,
    pub width: Length,
    pub stack: StackId,
}

impl Item {
    /// (x-extent, y-extent) in the given orientation.
    pub fn extent(&self, o: Orientation) -> (Length, Length) {
        match o {
            Orientation::Default => (self.length, self.width),
            Orientation::Rotated => (self.width, self.length),
        }
    }

    pub fn area(&self) -> Area {
        self.length * self.width
    }

    /// A square item has a single distinct orientation.
    pub fn is_square(&self) -> bool {
        self.length == self.width
    }
}

/// A forbidden rectangular zone on one plate. No cut may pass through it
/// and no item may cover any part of it; flush contact is allowed.
#[derive(Debug, Clone, Copy)]
pub struct Defect {
    pub id: DefectId,
    pub plate: PlateId,
    pub rect: Rect,
}

/// Serde input model. Items are listed inside their stacks; ids are
/// assigned in reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceData {
    pub plate: PlateDims,
    pub plate_count: usize,
    pub stacks: Vec<Vec<ItemDims>>,
    #[serde(default)]
    pub defects: Vec<DefectData>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlateDims {
    pub length: Length,
    pub width: Length,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ItemDims {
    pub length: Length,
    pub width: Length,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DefectData {
    pub plate: usize,
    pub x: Length,
    pub y: Length,
    pub length: Length,
    pub width: Length,
}

/// Read-only problem catalog: plate dimensions and count, items grouped
/// into ordered stacks, and the defect list per plate. The solver core
/// never mutates it.
#[derive(Debug, Clone)]
pub struct Instance {
    plate_length: Length,
    plate_width: Length,
    plate_count: usize,
    items: Vec<Item>,
    stacks: Vec<Vec<ItemId>>,
    defects: Vec<Defect>,
    defects_by_plate: Vec<Vec<DefectId>>,
    item_surface: Area,
}

impl Instance {
    pub fn from_data(data: &InstanceData) -> Result<Instance, String> {
        if data.plate.length <= 0 || data.plate.width <= 0 {
            return Err("plate dimensions must be positive".to_string());
        }
        if data.plate_count == 0 {
            return Err("plate count must be non-zero".to_string());
        }
        if data.stacks.iter().all(|s| s.is_empty()) {
            return Err("instance contains no items".to_string());
        }

        let mut items = Vec::new();
        let mut stacks = Vec::new();
        for (s, stack) in data.stacks.iter().enumerate() {
            let mut members = Vec::new();
            for dims in stack {
                if dims.length <= 0 || dims.width <= 0 {
                    return Err(format!(
                        "item {}x{} has non-positive dimensions",
                        dims.length, dims.width
                    ));
                }
                let fits = (dims.length <= data.plate.length && dims.width <= data.plate.width)
                    || (dims.width <= data.plate.length && dims.length <= data.plate.width);
                if !fits {
                    return Err(format!(
                        "item {}x{} does not fit in plate {}x{}",
                        dims.length, dims.width, data.plate.length, data.plate.width
                    ));
                }
                let id = ItemId(items.len());
                items.push(Item {
                    id,
                    length: dims.length,
                    width: dims.width,
                    stack: StackId(s),
                });
                members.push(id);
            }
            stacks.push(members);
        }

        let mut defects = Vec::new();
        let mut defects_by_plate = vec![Vec::new(); data.plate_count];
        for d in &data.defects {
            if d.plate >= data.plate_count {
                return Err(format!("defect references unknown plate {}", d.plate));
            }
            if d.length <= 0 || d.width <= 0 {
                return Err(format!(
                    "defect {}x{} has non-positive dimensions",
                    d.length, d.width
                ));
            }
            if d.x < 0 || d.y < 0 || d.x + d.length > data.plate.length || d.y + d.width > data.plate.width
            {
                return Err(format!(
                    "defect at ({}, {}) exceeds plate bounds",
                    d.x, d.y
                ));
            }
            let id = DefectId(defects.len());
            defects.push(Defect {
                id,
                plate: PlateId(d.plate),
                rect: Rect::new(d.x, d.y, d.x + d.length, d.y + d.width),
            });
            defects_by_plate[d.plate].push(id);
        }

        let item_surface = items.iter().map(|i| i.area()).sum();
        Ok(Instance {
            plate_length: data.plate.length,
            plate_width: data.plate.width,
            plate_count: data.plate_count,
            items,
            stacks,
            defects,
            defects_by_plate,
            item_surface,
        })
    }

    pub fn plate_length(&self) -> Length {
        self.plate_length
    }

    pub fn plate_width(&self) -> Length {
        self.plate_width
    }

    pub fn plate_area(&self) -> Area {
        self.plate_length * self.plate_width
    }

    pub fn plate_count(&self) -> usize {
        self.plate_count
    }

    pub fn item(&self, j: ItemId) -> &Item {
        &self.items[j.0]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item_number(&self) -> usize {
        self.items.len()
    }

    /// Total area of all items in the catalog.
    pub fn item_surface(&self) -> Area {
        self.item_surface
    }

    pub fn stack_number(&self) -> usize {
        self.stacks.len()
    }

    /// Items of stack `s` in mandatory cutting order.
    pub fn stack(&self, s: StackId) -> &[ItemId] {
        &self.stacks[s.0]
    }

    pub fn defect(&self, k: DefectId) -> &Defect {
        &self.defects[k.0]
    }

    pub fn defects(&self, p: PlateId) -> impl Iterator<Item = &Defect> {
        self.defects_by_plate[p.0].iter().map(|&k| &self.defects[k.0])
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Builds an instance from bare dimension lists; the shape most tests
    /// need. Defects are (plate, x, y, length, width).
    pub fn instance(
        plate: (Length, Length),
        plate_count: usize,
        stacks: &[&[(Length, Length)]],
        defects: &[(usize, Length, Length, Length, Length)],
    ) -> Instance {
        let data = InstanceData {
            plate: PlateDims {
                length: plate.0,
                width: plate.1,
            },
            plate_count,
            stacks: stacks
                .iter()
                .map(|s| {
                    s.iter()
                        .map(|&(length, width)| ItemDims { length, width })
                        .collect()
                })
                .collect(),
            defects: defects
                .iter()
                .map(|&(plate, x, y, length, width)| DefectData {
                    plate,
                    x,
                    y,
                    length,
                    width,
                })
                .collect(),
        };
        Instance::from_data(&data).expect("test instance must be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::instance;
    use super::*;

    #[test]
    fn test_ids_in_reading_order() {
        let ins = instance((100, 100), 2, &[&[(30, 20), (40, 10)], &[(50, 50)]], &[]);
        assert_eq!(ins.item_number(), 3);
        assert_eq!(ins.stack_number(), 2);
        assert_eq!(ins.stack(StackId(0)), &[ItemId(0), ItemId(1)]);
        assert_eq!(ins.stack(StackId(1)), &[ItemId(2)]);
        assert_eq!(ins.item(ItemId(1)).stack, StackId(0));
        assert_eq!(ins.item_surface(), 30 * 20 + 40 * 10 + 50 * 50);
    }

    #[test]
    fn test_defects_per_plate() {
        let ins = instance(
            (100, 100),
            2,
            &[&[(30, 20)]],
            &[(0, 10, 10, 5, 5), (1, 0, 0, 20, 20), (0, 50, 50, 1, 1)],
        );
        let on_first: Vec<_> = ins.defects(PlateId(0)).map(|d| d.id).collect();
        assert_eq!(on_first, vec![DefectId(0), DefectId(2)]);
        assert_eq!(ins.defect(DefectId(1)).rect, Rect::new(0, 0, 20, 20));
    }

    #[test]
    fn test_extent_and_orientation() {
        let ins = instance((100, 100), 1, &[&[(30, 20)]], &[]);
        let item = ins.item(ItemId(0));
        assert_eq!(item.extent(Orientation::Default), (30, 20));
        assert_eq!(item.extent(Orientation::Rotated), (20, 30));
        assert!(!item.is_square());
    }

    #[test]
    fn test_validation_errors() {
        let mut data = InstanceData {
            plate: PlateDims {
                length: 120,
                width: 80,
            },
            plate_count: 1,
            stacks: vec![vec![ItemDims {
                length: 150,
                width: 100,
            }]],
            defects: vec![],
        };
        assert!(Instance::from_data(&data).is_err());

        // 70x100 only fits the 120x80 plate rotated.
        data.stacks = vec![vec![ItemDims {
            length: 70,
            width: 100,
        }]];
        assert!(Instance::from_data(&data).is_ok());

        data.defects = vec![DefectData {
            plate: 0,
            x: 115,
            y: 0,
            length: 10,
            width: 10,
        }];
        assert!(Instance::from_data(&data).is_err());

        data.defects = vec![DefectData {
            plate: 1,
            x: 0,
            y: 0,
            length: 10,
            width: 10,
        }];
        assert!(Instance::from_data(&data).is_err());
    }

    #[test]
    fn test_json_model() {
        let json = r#"{
            "plate": {"length": 6000, "width": 3210},
            "plate_count": 100,
            "stacks": [[{"length": 1500, "width": 1000}]],
            "defects": [{"plate": 0, "x": 2000, "y": 1200, "length": 50, "width": 30}]
        }"#;
        let data: InstanceData = serde_json::from_str(json).unwrap();
        let ins = Instance::from_data(&data).unwrap();
        assert_eq!(ins.plate_length(), 6000);
        assert_eq!(ins.defects(PlateId(0)).count(), 1);
    }
}
