use tracing::debug;

use crate::config::PlacementConfig;
use crate::error::Result;
use crate::grid::GridPoint;
use crate::history::{Edit, History};
use crate::model::{ElementKind, FloorId, Node, NodeId, NodeRecord, NodeRepository};

use super::{PlacementQuery, PlacementResult};

/// Pointer input for a placement tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolEvent {
    /// The pointer is over this grid position.
    Hover(GridPoint),
    PointerDown,
    PointerUp,
    /// The pointer left the grid, or the tool was deactivated.
    Leave,
}

impl ToolEvent {
    /// Maps an optional grid hit to an event: off-grid positions become `Leave`.
    #[must_use]
    pub fn from_hit(hit: Option<GridPoint>) -> Self {
        hit.map_or(Self::Leave, Self::Hover)
    }
}

/// States of a placement tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolState {
    Idle,
    /// Showing a tentative element.
    Previewing(PlacementResult),
    /// Pointer held down over a preview; released to commit.
    Committing(PlacementResult),
}

/// What the tool reports back after each event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolOutput {
    Nothing,
    Preview(PlacementResult),
    Committed(NodeId),
    /// The pointer was released over an invalid placement.
    Rejected(PlacementResult),
}

/// Door/window placement tool.
#[derive(Debug, Clone)]
pub struct PlacementTool {
    kind: ElementKind,
    floor: FloorId,
    config: PlacementConfig,
    state: ToolState,
    cursor: Option<GridPoint>,
    last_rotation: f64,
}

impl PlacementTool {
    #[must_use]
    pub fn new(kind: ElementKind, floor: FloorId, config: PlacementConfig) -> Self {
        Self {
            kind,
            floor,
            config,
            state: ToolState::Idle,
            cursor: None,
            last_rotation: 0.0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ToolState {
        &self.state
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Feeds every event from `events` through [`Self::handle`].
    ///
    /// # Errors
    ///
    /// Stops at the first repository error.
    pub fn run<R, I>(
        &mut self,
        events: I,
        repo: &mut R,
        history: &mut History,
    ) -> Result<Vec<ToolOutput>>
    where
        R: NodeRepository + ?Sized,
        I: IntoIterator<Item = ToolEvent>,
    {
        events
            .into_iter()
            .map(|event| self.handle(event, repo, history))
            .collect()
    }

    /// Advances the state machine by one event.
    ///
    /// # Errors
    ///
    /// Returns an error if committing the element fails in the repository.
    pub fn handle<R: NodeRepository + ?Sized>(
        &mut self,
        event: ToolEvent,
        repo: &mut R,
        history: &mut History,
    ) -> Result<ToolOutput> {
        match (event, self.state) {
            (ToolEvent::Hover(p), state) => {
                self.cursor = Some(p);
                let result = self.evaluate(repo, p);
                self.state = match state {
                    ToolState::Committing(_) => ToolState::Committing(result),
                    _ => ToolState::Previewing(result),
                };
                Ok(ToolOutput::Preview(result))
            }
            (ToolEvent::PointerDown, ToolState::Previewing(result)) => {
                self.state = ToolState::Committing(result);
                Ok(ToolOutput::Nothing)
            }
            (ToolEvent::PointerUp, ToolState::Committing(result)) => {
                let output = self.commit(repo, history, &result)?;
                self.state = match self.cursor {
                    Some(p) => ToolState::Previewing(self.evaluate(repo, p)),
                    None => ToolState::Idle,
                };
                Ok(output)
            }
            (ToolEvent::Leave, _) => {
                self.state = ToolState::Idle;
                self.cursor = None;
                Ok(ToolOutput::Nothing)
            }
            _ => Ok(ToolOutput::Nothing),
        }
    }

    fn evaluate<R: NodeRepository + ?Sized>(&mut self, repo: &R, cursor: GridPoint) -> PlacementResult {
        let walls = repo.walls(self.floor);
        let elements = repo.elements(self.floor);
        let result = PlacementQuery::new(cursor, self.kind)
            .with_config(self.config)
            .with_last_rotation(self.last_rotation)
            .execute(&walls, &elements);
        if result.nearest_wall.is_some() {
            self.last_rotation = result.rotation;
        }
        result
    }

    fn commit<R: NodeRepository + ?Sized>(
        &self,
        repo: &mut R,
        history: &mut History,
        result: &PlacementResult,
    ) -> Result<ToolOutput> {
        let Some(element) = result.to_element(self.kind) else {
            return Ok(ToolOutput::Rejected(*result));
        };
        let mut record = NodeRecord::new(self.floor, Node::Element(element));
        record.parent = element.parent_wall();
        let id = repo.add_node(record.clone())?;
        history.push(Edit::new("place element").added(id, record));
        debug!(kind = ?self.kind, ?id, offset = ?result.wall_offset, "element placed");
        Ok(ToolOutput::Committed(id))
    }
}
