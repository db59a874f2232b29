use serde::{Deserialize, Serialize};

/// All coordinates and dimensions are integer millimetres.
pub type Length = i64;
pub type Area = i64;

/// Cut nesting depth: -1 root, 0 plate, 1..=4 cuts.
pub type Depth = i8;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Index of a node in the solution arena.
    NodeId
);
id_type!(
    /// Index of an item in the instance catalog.
    ItemId
);
id_type!(
    /// Index of a stack in the instance catalog.
    StackId
);
id_type!(
    /// Index of a defect in the instance catalog.
    DefectId
);
id_type!(
    /// Index of a plate, in cutting order.
    PlateId
);

/// Axis-aligned rectangle given by its four boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: Length,
    pub bottom: Length,
    pub right: Length,
    pub top: Length,
}

impl Rect {
    pub fn new(left: Length, bottom: Length, right: Length, top: Length) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn length(&self) -> Length {
        self.right - self.left
    }

    pub fn width(&self) -> Length {
        self.top - self.bottom
    }

    pub fn area(&self) -> Area {
        self.length() * self.width()
    }

    /// Positive-area overlap test. Shared boundaries do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.bottom < other.top
            && other.bottom < self.top
    }

    /// Grows this rectangle to cover `other`.
    pub fn enclose(&mut self, other: &Rect) {
        self.left = self.left.min(other.left);
        self.bottom = self.bottom.min(other.bottom);
        self.right = self.right.max(other.right);
        self.top = self.top.max(other.top);
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{},{}]x[{},{}]",
            self.left, self.right, self.bottom, self.top
        )
    }
}

/// Item orientation: `Default` keeps the catalog length along x,
/// `Rotated` swaps the two dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Default,
    Rotated,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Default => write!(f, "default"),
            Orientation::Rotated => write!(f, "rotated"),
        }
    }
}

/// Where an item sits inside its 3-cut.
///
/// `Bottom` is the common case. `Top` marks items pinned flush against the
/// 2-cut's upper boundary: the upper item of a two-item 4-cut, and items
/// placed above a defect (which slide up whenever the 2-cut grows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Bottom,
    Top,
}
