use slotmap::SlotMap;

use crate::error::{OperationError, Result, StoreError};

use super::{FloorData, FloorId, Node, NodeId, NodeRecord, RoofSegment, WallMountedElement, WallSegment};

/// Storage the editing tools read and write through.
///
/// Every tool depends on this trait only, so tests drive them with a
/// [`MemoryStore`] and the application plugs in its reactive store.
pub trait NodeRepository {
    /// Floor data, if the floor exists.
    fn floor(&self, id: FloorId) -> Option<&FloorData>;

    /// A live node.
    fn node(&self, id: NodeId) -> Option<&NodeRecord>;

    /// Inserts a node and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the floor is unknown or the parent is not a live node
    /// on the same floor.
    fn add_node(&mut self, record: NodeRecord) -> Result<NodeId>;

    /// Replaces a live node, returning the previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not live, or if the new floor/parent is invalid.
    fn update_node(&mut self, id: NodeId, record: NodeRecord) -> Result<NodeRecord>;

    /// Deletes a single node (children are left untouched), returning its record.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not live.
    fn delete_node(&mut self, id: NodeId) -> Result<NodeRecord>;

    /// Deletes a node for good; its id is never restored.
    ///
    /// For preview nodes that never reach history. Stores that keep no
    /// per-id state for deleted nodes can rely on the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not live.
    fn purge_node(&mut self, id: NodeId) -> Result<NodeRecord> {
        self.delete_node(id)
    }

    /// Brings a deleted node back under its original id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id was never issued, is still live, or the floor is gone.
    fn restore_node(&mut self, id: NodeId, record: NodeRecord) -> Result<()>;

    /// Ids of all live nodes on a floor, in insertion order.
    fn node_ids(&self, floor: FloorId) -> Vec<NodeId>;

    /// Live nodes whose parent is `parent`.
    fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let Some(floor) = self.node(parent).map(|r| r.floor) else {
            return Vec::new();
        };
        self.node_ids(floor)
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(|r| r.parent == Some(parent)))
            .collect()
    }

    /// Deletes a node and, recursively, everything parented to it.
    ///
    /// Returns the removed records parent-first.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not live.
    fn delete_with_children(&mut self, id: NodeId) -> Result<Vec<(NodeId, NodeRecord)>> {
        let children = self.children(id);
        let record = self.delete_node(id)?;
        let mut removed = vec![(id, record)];
        for child in children {
            removed.extend(self.delete_with_children(child)?);
        }
        Ok(removed)
    }

    /// Committed (non-preview) walls on a floor.
    fn walls(&self, floor: FloorId) -> Vec<(NodeId, WallSegment)> {
        self.node_ids(floor)
            .into_iter()
            .filter_map(|id| {
                let record = self.node(id)?;
                if record.preview {
                    return None;
                }
                record.node.as_wall().map(|w| (id, *w))
            })
            .collect()
    }

    /// Committed doors and windows on a floor.
    fn elements(&self, floor: FloorId) -> Vec<(NodeId, WallMountedElement)> {
        self.node_ids(floor)
            .into_iter()
            .filter_map(|id| {
                let record = self.node(id)?;
                if record.preview {
                    return None;
                }
                record.node.as_element().map(|e| (id, *e))
            })
            .collect()
    }

    /// The roof stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is missing or not a roof.
    fn roof(&self, id: NodeId) -> Result<RoofSegment> {
        let record = self
            .node(id)
            .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")))?;
        record
            .node
            .as_roof()
            .copied()
            .ok_or_else(|| OperationError::WrongKind { expected: "roof" }.into())
    }
}

/// In-memory repository backed by generational arenas.
///
/// Deleted nodes keep their slot as a tombstone so history replay can restore
/// them under the same id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    floors: SlotMap<FloorId, FloorData>,
    nodes: SlotMap<NodeId, Option<NodeRecord>>,
}

impl MemoryStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a floor and returns its ID.
    pub fn add_floor(&mut self, data: FloorData) -> FloorId {
        self.floors.insert(data)
    }

    /// Deletes a floor and every node on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the floor is not found.
    pub fn delete_floor(&mut self, id: FloorId) -> Result<FloorData> {
        let data = self.floors.remove(id).ok_or(StoreError::FloorNotFound)?;
        self.nodes
            .retain(|_, slot| slot.as_ref().is_none_or(|r| r.floor != id));
        Ok(data)
    }

    /// Number of live nodes across all floors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.values().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_scope(&self, record: &NodeRecord) -> Result<()> {
        if !self.floors.contains_key(record.floor) {
            return Err(StoreError::FloorNotFound.into());
        }
        if let Some(parent) = record.parent {
            let ok = self.node(parent).is_some_and(|p| p.floor == record.floor);
            if !ok {
                return Err(StoreError::InvalidParent(format!("{parent:?}")).into());
            }
        }
        Ok(())
    }
}

impl NodeRepository for MemoryStore {
    fn floor(&self, id: FloorId) -> Option<&FloorData> {
        self.floors.get(id)
    }

    fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn add_node(&mut self, record: NodeRecord) -> Result<NodeId> {
        self.check_scope(&record)?;
        Ok(self.nodes.insert(Some(record)))
    }

    fn update_node(&mut self, id: NodeId, record: NodeRecord) -> Result<NodeRecord> {
        if self.node(id).is_none() {
            return Err(StoreError::NodeNotFound(format!("{id:?}")).into());
        }
        self.check_scope(&record)?;
        let slot = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")))?;
        slot.replace(record)
            .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")).into())
    }

    fn delete_node(&mut self, id: NodeId) -> Result<NodeRecord> {
        self.nodes
            .get_mut(id)
            .and_then(Option::take)
            .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")).into())
    }

    fn purge_node(&mut self, id: NodeId) -> Result<NodeRecord> {
        if self.node(id).is_none() {
            return Err(StoreError::NodeNotFound(format!("{id:?}")).into());
        }
        self.nodes
            .remove(id)
            .flatten()
            .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")).into())
    }

    fn restore_node(&mut self, id: NodeId, record: NodeRecord) -> Result<()> {
        if !self.floors.contains_key(record.floor) {
            return Err(StoreError::FloorNotFound.into());
        }
        let slot = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")))?;
        if slot.is_some() {
            return Err(StoreError::NodeAlive(format!("{id:?}")).into());
        }
        *slot = Some(record);
        Ok(())
    }

    fn node_ids(&self, floor: FloorId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, slot)| slot.as_ref().is_some_and(|r| r.floor == floor))
            .map(|(id, _)| id)
            .collect()
    }
}

/// Convenience for call sites that expect a specific variant.
///
/// # Errors
///
/// Returns an error if the node is missing or not a wall.
pub fn wall<R: NodeRepository + ?Sized>(repo: &R, id: NodeId) -> Result<WallSegment> {
    let record = repo
        .node(id)
        .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")))?;
    match record.node {
        Node::Wall(w) => Ok(w),
        _ => Err(OperationError::WrongKind { expected: "wall" }.into()),
    }
}
