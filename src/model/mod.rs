pub mod element;
pub mod roof;
pub mod store;
pub mod wall;

pub use element::{ElementKind, Mount, WallMountedElement};
pub use roof::RoofSegment;
pub use store::{MemoryStore, NodeRepository};
pub use wall::{WallRenderGeometry, WallSegment};

slotmap::new_key_type! {
    /// Unique identifier for a floor (level) in a repository.
    pub struct FloorId;
}

slotmap::new_key_type! {
    /// Unique identifier for a node in a repository.
    pub struct NodeId;
}

/// A floor of the building.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorData {
    pub name: String,
    /// Height of the floor above ground, in grid units.
    pub elevation: f64,
}

/// Container node for the walls of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
}

/// A node of the building model.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Wall(WallSegment),
    Roof(RoofSegment),
    Element(WallMountedElement),
    Group(Group),
}

impl Node {
    /// Short name of the variant, for logs and error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Wall(_) => "wall",
            Self::Roof(_) => "roof",
            Self::Element(_) => "element",
            Self::Group(_) => "group",
        }
    }

    #[must_use]
    pub fn as_wall(&self) -> Option<&WallSegment> {
        match self {
            Self::Wall(w) => Some(w),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_roof(&self) -> Option<&RoofSegment> {
        match self {
            Self::Roof(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&WallMountedElement> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// A node together with its scoping: floor, optional parent and preview flag.
///
/// Preview nodes are tentative geometry shown while a tool is active; a
/// commit clears the flag.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub floor: FloorId,
    pub parent: Option<NodeId>,
    pub preview: bool,
    pub node: Node,
}

impl NodeRecord {
    /// A committed node on `floor` with no parent.
    #[must_use]
    pub fn new(floor: FloorId, node: Node) -> Self {
        Self {
            floor,
            parent: None,
            preview: false,
            node,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn as_preview(mut self) -> Self {
        self.preview = true;
        self
    }
}
