//! Freehand room entry: clicks accumulate vertices into walls, hovering the
//! first vertex closes the loop and a double click finishes an open run.
//!
//! All walls and the room group live in the repository as preview nodes
//! while the gesture is in progress. Closing or finishing clears the preview
//! flag and records a single history entry; abandoning deletes them.

use tracing::{debug, trace, warn};

use crate::config::{PolygonConfig, WallDefaults};
use crate::error::{Result, StoreError};
use crate::grid::GridPoint;
use crate::history::{Edit, History};
use crate::math::distance_2d::distance;
use crate::math::snap::snap_to_axis;
use crate::math::TOLERANCE;
use crate::model::{FloorId, Group, Node, NodeId, NodeRecord, NodeRepository, WallSegment};

/// Input for the polygon builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolygonEvent {
    Move(GridPoint),
    /// A click with its timestamp in milliseconds.
    Click { position: GridPoint, time_ms: u64 },
    DoubleClick,
    /// Tool switch or unmount.
    Abandon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonState {
    Empty,
    Drawing,
    /// The last gesture ended in a closed loop.
    Closed,
    /// The last gesture ended in an open polyline.
    Finished,
}

/// A committed room outline.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomPolygon {
    pub group: NodeId,
    pub walls: Vec<NodeId>,
    pub points: Vec<GridPoint>,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PolygonOutcome {
    Nothing,
    /// First click; the room group was created.
    Started(NodeId),
    Preview { cursor: GridPoint, closing: bool },
    /// A wall was fixed in place.
    PointAdded(NodeId),
    Closed(RoomPolygon),
    Finished(RoomPolygon),
    Abandoned,
}

/// State machine for freehand room entry.
#[derive(Debug, Clone)]
pub struct PolygonBuilder {
    floor: FloorId,
    config: PolygonConfig,
    defaults: WallDefaults,
    state: PolygonState,
    points: Vec<GridPoint>,
    group: Option<NodeId>,
    cursor_wall: Option<NodeId>,
    placed_walls: Vec<NodeId>,
    closing: bool,
    last_click_ms: Option<u64>,
}

impl PolygonBuilder {
    #[must_use]
    pub fn new(floor: FloorId, config: PolygonConfig, defaults: WallDefaults) -> Self {
        Self {
            floor,
            config,
            defaults,
            state: PolygonState::Empty,
            points: Vec::new(),
            group: None,
            cursor_wall: None,
            placed_walls: Vec::new(),
            closing: false,
            last_click_ms: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> PolygonState {
        self.state
    }

    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    #[must_use]
    pub fn placed_walls(&self) -> &[NodeId] {
        &self.placed_walls
    }

    #[must_use]
    pub fn cursor_wall(&self) -> Option<NodeId> {
        self.cursor_wall
    }

    /// Whether a click now would close the loop.
    #[must_use]
    pub fn closing_affordance(&self) -> bool {
        self.closing
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.state == PolygonState::Drawing
    }

    /// Dispatches one event.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn handle<R: NodeRepository + ?Sized>(
        &mut self,
        event: PolygonEvent,
        repo: &mut R,
        history: &mut History,
    ) -> Result<PolygonOutcome> {
        match event {
            PolygonEvent::Move(p) => self.pointer_move(p, repo),
            PolygonEvent::Click { position, time_ms } => self.click(position, time_ms, repo, history),
            PolygonEvent::DoubleClick => self.double_click(repo, history),
            PolygonEvent::Abandon => self.abandon(repo),
        }
    }

    /// Moves the cursor wall's free end to the axis-snapped `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor wall disappeared from the repository.
    pub fn pointer_move<R: NodeRepository + ?Sized>(
        &mut self,
        position: GridPoint,
        repo: &mut R,
    ) -> Result<PolygonOutcome> {
        let (Some(last), Some(cursor)) = (self.points.last().copied(), self.cursor_wall) else {
            return Ok(PolygonOutcome::Nothing);
        };
        let target = self.snapped(&last, &position);
        self.closing = self.closes_at(&target);
        self.write_cursor(repo, cursor, &last, &target)?;
        trace!(?target, closing = self.closing, "polygon cursor");
        Ok(PolygonOutcome::Preview {
            cursor: target,
            closing: self.closing,
        })
    }

    /// Places a vertex, closes the loop, or, when it follows the previous
    /// click within the double-click window, finishes an open polyline.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn click<R: NodeRepository + ?Sized>(
        &mut self,
        position: GridPoint,
        time_ms: u64,
        repo: &mut R,
        history: &mut History,
    ) -> Result<PolygonOutcome> {
        let previous = self.last_click_ms.replace(time_ms);
        let double = previous.is_some_and(|t| time_ms.saturating_sub(t) <= self.config.double_click_ms);
        if double && self.is_drawing() && self.points.len() >= 2 {
            self.last_click_ms = None;
            return self.double_click(repo, history);
        }

        let (Some(last), Some(cursor)) = (self.points.last().copied(), self.cursor_wall) else {
            return self.start(position, repo);
        };

        let target = self.snapped(&last, &position);
        if self.closes_at(&target) {
            return self.close(repo, history);
        }
        if same_point(&target, &last) {
            return Ok(PolygonOutcome::Nothing);
        }

        self.write_cursor(repo, cursor, &last, &target)?;
        self.placed_walls.push(cursor);
        self.points.push(target);
        self.cursor_wall = Some(self.add_cursor_wall(repo, target)?);
        self.closing = false;
        Ok(PolygonOutcome::PointAdded(cursor))
    }

    /// Finishes an open polyline. Needs at least two points.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn double_click<R: NodeRepository + ?Sized>(
        &mut self,
        repo: &mut R,
        history: &mut History,
    ) -> Result<PolygonOutcome> {
        if !self.is_drawing() || self.points.len() < 2 {
            return Ok(PolygonOutcome::Nothing);
        }
        if let Some(cursor) = self.cursor_wall.take() {
            repo.purge_node(cursor)?;
        }
        let room = self.commit(repo, history, false)?;
        Ok(PolygonOutcome::Finished(room))
    }

    /// Deletes every preview node of the current gesture.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn abandon<R: NodeRepository + ?Sized>(&mut self, repo: &mut R) -> Result<PolygonOutcome> {
        if !self.is_drawing() {
            return Ok(PolygonOutcome::Nothing);
        }
        let walls = self.placed_walls.iter().chain(self.cursor_wall.iter());
        for &id in walls.chain(self.group.iter()) {
            if repo.node(id).is_some() {
                repo.purge_node(id)?;
            }
        }
        debug!(points = self.points.len(), "polygon abandoned");
        self.reset(PolygonState::Empty);
        Ok(PolygonOutcome::Abandoned)
    }

    fn start<R: NodeRepository + ?Sized>(&mut self, p0: GridPoint, repo: &mut R) -> Result<PolygonOutcome> {
        self.reset(PolygonState::Drawing);
        let group = repo.add_node(
            NodeRecord::new(
                self.floor,
                Node::Group(Group {
                    name: "room".to_owned(),
                }),
            )
            .as_preview(),
        )?;
        self.group = Some(group);
        self.points.push(p0);
        self.cursor_wall = Some(self.add_cursor_wall(repo, p0)?);
        Ok(PolygonOutcome::Started(group))
    }

    fn close<R: NodeRepository + ?Sized>(&mut self, repo: &mut R, history: &mut History) -> Result<PolygonOutcome> {
        let (Some(&first), Some(&last), Some(cursor)) =
            (self.points.first(), self.points.last(), self.cursor_wall.take())
        else {
            return Ok(PolygonOutcome::Nothing);
        };
        self.write_cursor(repo, cursor, &last, &first)?;
        self.placed_walls.push(cursor);
        let room = self.commit(repo, history, true)?;
        Ok(PolygonOutcome::Closed(room))
    }

    /// Clears the preview flag on the group and every placed wall and
    /// records them as one edit.
    fn commit<R: NodeRepository + ?Sized>(
        &mut self,
        repo: &mut R,
        history: &mut History,
        closed: bool,
    ) -> Result<RoomPolygon> {
        let group = self
            .group
            .ok_or_else(|| StoreError::NodeNotFound("room group".to_owned()))?;
        let mut edit = Edit::new(if closed { "close room" } else { "finish walls" });
        for &id in std::iter::once(&group).chain(&self.placed_walls) {
            let mut record = repo
                .node(id)
                .cloned()
                .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")))?;
            record.preview = false;
            repo.update_node(id, record.clone())?;
            edit = edit.added(id, record);
        }
        history.push(edit);

        let room = RoomPolygon {
            group,
            walls: std::mem::take(&mut self.placed_walls),
            points: std::mem::take(&mut self.points),
            closed,
        };
        debug!(walls = room.walls.len(), closed, "room committed");
        self.reset(if closed {
            PolygonState::Closed
        } else {
            PolygonState::Finished
        });
        Ok(room)
    }

    fn add_cursor_wall<R: NodeRepository + ?Sized>(&self, repo: &mut R, at: GridPoint) -> Result<NodeId> {
        let wall = WallSegment::anchored(at, &self.defaults);
        let mut record = NodeRecord::new(self.floor, Node::Wall(wall)).as_preview();
        record.parent = self.group;
        repo.add_node(record)
    }

    fn write_cursor<R: NodeRepository + ?Sized>(
        &self,
        repo: &mut R,
        id: NodeId,
        from: &GridPoint,
        to: &GridPoint,
    ) -> Result<()> {
        let mut record = repo
            .node(id)
            .cloned()
            .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")))?;
        record.node = Node::Wall(WallSegment::anchored(*from, &self.defaults).with_end(*to));
        repo.update_node(id, record)?;
        Ok(())
    }

    fn snapped(&self, last: &GridPoint, raw: &GridPoint) -> GridPoint {
        let (target, _) = snap_to_axis(last, raw);
        if let Some(first) = self.points.first() {
            // Snapping rounds through f64; land exactly on the first vertex when within tolerance.
            if self.points.len() >= 3 && same_point(&target, first) {
                return *first;
            }
        }
        target
    }

    fn closes_at(&self, target: &GridPoint) -> bool {
        self.points.len() >= 3 && self.points.first().is_some_and(|first| same_point(target, first))
    }

    fn reset(&mut self, state: PolygonState) {
        self.state = state;
        self.points.clear();
        self.group = None;
        self.cursor_wall = None;
        self.placed_walls.clear();
        self.closing = false;
    }
}

fn same_point(a: &GridPoint, b: &GridPoint) -> bool {
    distance(a, b) < TOLERANCE
}

/// Binds a builder to a repository for the length of a tool activation.
///
/// Dropping the session abandons a gesture still in progress, so no preview
/// walls outlive the tool.
pub struct PolygonSession<'a, R: NodeRepository + ?Sized> {
    repo: &'a mut R,
    history: &'a mut History,
    builder: PolygonBuilder,
}

impl<'a, R: NodeRepository + ?Sized> PolygonSession<'a, R> {
    #[must_use]
    pub fn new(repo: &'a mut R, history: &'a mut History, builder: PolygonBuilder) -> Self {
        Self {
            repo,
            history,
            builder,
        }
    }

    #[must_use]
    pub fn builder(&self) -> &PolygonBuilder {
        &self.builder
    }

    /// Read access to the repository while the session holds it.
    #[must_use]
    pub fn repo(&self) -> &R {
        self.repo
    }

    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn handle(&mut self, event: PolygonEvent) -> Result<PolygonOutcome> {
        self.builder.handle(event, self.repo, self.history)
    }

    /// Feeds a sequence of events, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn run<I: IntoIterator<Item = PolygonEvent>>(&mut self, events: I) -> Result<Vec<PolygonOutcome>> {
        events.into_iter().map(|e| self.handle(e)).collect()
    }
}

impl<R: NodeRepository + ?Sized> Drop for PolygonSession<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.builder.abandon(self.repo) {
            warn!(error = %e, "polygon teardown failed");
        }
    }
}
