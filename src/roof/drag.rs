use std::f64::consts::{PI, TAU};

use tracing::{debug, trace, warn};

use crate::config::RoofConfig;
use crate::error::{OperationError, Result, StoreError};
use crate::grid::GridPoint;
use crate::history::{Edit, History};
use crate::math::polygon_2d::rotate_about;
use crate::math::snap::{snap_angle, snap_point, snap_to_step};
use crate::math::{Vector2, SEGMENT_EPSILON, TOLERANCE};
use crate::model::{Node, NodeId, NodeRecord, NodeRepository, RoofSegment};

/// Grabbable parts of a roof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoofHandle {
    RidgeHeight,
    /// The gable at the ridge start.
    EdgeFront,
    /// The gable at the ridge end.
    EdgeBack,
    /// The base edge on the left-normal side.
    EdgeLeft,
    EdgeRight,
    Rotate,
    TranslateRidgeAxis,
    TranslatePerpAxis,
    TranslateFree,
}

/// Keyboard modifiers held during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Quantise the drag (whole units, height steps, 45° turns).
    pub snap: bool,
    /// Scale pointer movement down for precise adjustment.
    pub fine: bool,
}

/// One pointer reading: floor-plane position plus a vertical coordinate
/// used by the height handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: GridPoint,
    pub elevation: f64,
    pub modifiers: Modifiers,
}

impl PointerSample {
    #[must_use]
    pub fn at(position: GridPoint) -> Self {
        Self {
            position,
            elevation: 0.0,
            modifiers: Modifiers::default(),
        }
    }

    #[must_use]
    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A drag in progress, independent of any storage.
///
/// Every update recomputes the segment from the state captured at pointer
/// down plus the cumulative pointer delta, so frames never accumulate error.
#[derive(Debug, Clone)]
pub struct RoofDragSession {
    handle: RoofHandle,
    config: RoofConfig,
    origin: RoofSegment,
    anchor: PointerSample,
    current: RoofSegment,
    /// Rotation pivot and unwrapped pointer angle around it.
    pivot: GridPoint,
    last_angle: Option<f64>,
    turned: f64,
}

impl RoofDragSession {
    #[must_use]
    pub fn begin(origin: RoofSegment, handle: RoofHandle, anchor: PointerSample, config: RoofConfig) -> Self {
        let pivot = origin.footprint_centroid();
        Self {
            handle,
            config,
            origin,
            anchor,
            current: origin,
            pivot,
            last_angle: pointer_angle(&pivot, &anchor.position),
            turned: 0.0,
        }
    }

    #[must_use]
    pub fn handle(&self) -> RoofHandle {
        self.handle
    }

    /// Segment captured at pointer down.
    #[must_use]
    pub fn origin(&self) -> &RoofSegment {
        &self.origin
    }

    #[must_use]
    pub fn current(&self) -> &RoofSegment {
        &self.current
    }

    #[must_use]
    pub fn changed(&self) -> bool {
        self.current != self.origin
    }

    /// Applies a pointer sample and returns the resulting segment.
    pub fn update(&mut self, sample: &PointerSample) -> RoofSegment {
        let scale = if sample.modifiers.fine {
            self.config.fine_factor
        } else {
            1.0
        };
        let snap = sample.modifiers.snap;
        let delta = (sample.position - self.anchor.position) * scale;

        self.current = match self.handle {
            RoofHandle::RidgeHeight => {
                self.drag_height((sample.elevation - self.anchor.elevation) * scale, snap)
            }
            RoofHandle::EdgeFront | RoofHandle::EdgeBack => self.drag_gable(&delta, snap),
            RoofHandle::EdgeLeft | RoofHandle::EdgeRight => self.drag_side(&delta, snap),
            RoofHandle::Rotate => {
                self.track_angle(&sample.position);
                self.drag_rotation(self.turned * scale, snap)
            }
            RoofHandle::TranslateRidgeAxis
            | RoofHandle::TranslatePerpAxis
            | RoofHandle::TranslateFree => self.drag_translation(&delta, snap),
        };
        self.current
    }

    /// Ends the drag. After a rotation the ridge endpoints are rounded to
    /// the release precision.
    pub fn finish(&mut self) -> RoofSegment {
        if self.handle == RoofHandle::Rotate && self.changed() {
            let step = self.config.release_precision;
            self.current.start = snap_point(&self.current.start, step);
            self.current.end = snap_point(&self.current.end, step);
        }
        self.current
    }

    fn drag_height(&self, rise: f64, snap: bool) -> RoofSegment {
        let mut height = self.origin.height + rise;
        if snap {
            height = snap_to_step(height, self.config.height_step);
        }
        RoofSegment {
            height: height.clamp(self.config.min_height, self.config.max_height),
            ..self.origin
        }
    }

    fn drag_gable(&self, delta: &Vector2, snap: bool) -> RoofSegment {
        let Some(dir) = self.origin.ridge_direction() else {
            return self.origin;
        };
        let mut along = delta.dot(&dir);
        if snap {
            along = along.round();
        }
        let slack = self.origin.ridge_length() - SEGMENT_EPSILON;
        let mut next = self.origin;
        if self.handle == RoofHandle::EdgeFront {
            next.start += dir * along.min(slack);
        } else {
            next.end += dir * along.max(-slack);
        }
        next
    }

    /// Moves one base edge, keeps the other fixed and recentres the ridge
    /// between them.
    fn drag_side(&self, delta: &Vector2, snap: bool) -> RoofSegment {
        let Some(perp) = self.origin.perp_direction() else {
            return self.origin;
        };
        let outward = if self.handle == RoofHandle::EdgeLeft {
            perp
        } else {
            -perp
        };
        let mut push = delta.dot(&outward);
        if snap {
            push = push.round();
        }

        let min_total = 2.0 * self.config.min_width;
        let (mut left, mut right) = (self.origin.left_width, self.origin.right_width);
        if self.handle == RoofHandle::EdgeLeft {
            left = (left + push).max(min_total - right);
        } else {
            right = (right + push).max(min_total - left);
        }

        let shift = perp * ((left - right) * 0.5);
        let half = (left + right) * 0.5;
        RoofSegment {
            start: self.origin.start + shift,
            end: self.origin.end + shift,
            left_width: half,
            right_width: half,
            ..self.origin
        }
    }

    fn track_angle(&mut self, position: &GridPoint) {
        let Some(angle) = pointer_angle(&self.pivot, position) else {
            return;
        };
        if let Some(last) = self.last_angle {
            let mut step = angle - last;
            if step > PI {
                step -= TAU;
            } else if step < -PI {
                step += TAU;
            }
            self.turned += step;
        }
        self.last_angle = Some(angle);
    }

    fn drag_rotation(&self, angle: f64, snap: bool) -> RoofSegment {
        let angle = if snap {
            snap_angle(angle, self.config.rotation_step)
        } else {
            angle
        };
        RoofSegment {
            start: rotate_about(&self.origin.start, &self.pivot, angle),
            end: rotate_about(&self.origin.end, &self.pivot, angle),
            ..self.origin
        }
    }

    fn drag_translation(&self, delta: &Vector2, snap: bool) -> RoofSegment {
        let offset = match self.handle {
            RoofHandle::TranslateRidgeAxis | RoofHandle::TranslatePerpAxis => {
                let axis = if self.handle == RoofHandle::TranslateRidgeAxis {
                    self.origin.ridge_direction()
                } else {
                    self.origin.perp_direction()
                };
                let Some(axis) = axis else {
                    return self.origin;
                };
                let mut along = delta.dot(&axis);
                if snap {
                    along = along.round();
                }
                axis * along
            }
            _ if snap => delta.map(f64::round),
            _ => *delta,
        };
        RoofSegment {
            start: self.origin.start + offset,
            end: self.origin.end + offset,
            ..self.origin
        }
    }
}

fn pointer_angle(pivot: &GridPoint, position: &GridPoint) -> Option<f64> {
    let d = position - pivot;
    (d.norm() > TOLERANCE).then(|| d.y.atan2(d.x))
}

/// A drag bound to a roof node in a repository.
///
/// Each update writes the segment through to the repository. Releasing pushes
/// one history entry when the roof changed. Dropping an unreleased drag
/// releases it, so the store always holds the last written frame.
pub struct RoofDrag<'a, R: NodeRepository + ?Sized> {
    repo: &'a mut R,
    history: &'a mut History,
    id: NodeId,
    before: NodeRecord,
    session: RoofDragSession,
    released: bool,
}

impl<'a, R: NodeRepository + ?Sized> RoofDrag<'a, R> {
    /// Grabs `handle` of the roof `id` at pointer position `anchor`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a live roof node.
    pub fn begin(
        repo: &'a mut R,
        history: &'a mut History,
        id: NodeId,
        handle: RoofHandle,
        anchor: PointerSample,
        config: RoofConfig,
    ) -> Result<Self> {
        let before = repo
            .node(id)
            .cloned()
            .ok_or_else(|| StoreError::NodeNotFound(format!("{id:?}")))?;
        let Node::Roof(origin) = before.node else {
            return Err(OperationError::WrongKind { expected: "roof" }.into());
        };
        debug!(?id, ?handle, "roof drag started");
        Ok(Self {
            repo,
            history,
            id,
            before,
            session: RoofDragSession::begin(origin, handle, anchor, config),
            released: false,
        })
    }

    #[must_use]
    pub fn session(&self) -> &RoofDragSession {
        &self.session
    }

    /// Applies a pointer sample and writes the result to the repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the roof node was removed during the drag.
    pub fn update(&mut self, sample: &PointerSample) -> Result<RoofSegment> {
        let segment = self.session.update(sample);
        self.write(segment)?;
        trace!(id = ?self.id, ?segment, "roof drag frame");
        Ok(segment)
    }

    /// Ends the drag. Returns whether the roof changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the final segment cannot be written.
    pub fn release(mut self) -> Result<bool> {
        self.finish()
    }

    fn finish(&mut self) -> Result<bool> {
        if self.released {
            return Ok(false);
        }
        self.released = true;
        let segment = self.session.finish();
        if !self.session.changed() {
            self.write(segment)?;
            return Ok(false);
        }
        let after = self.write(segment)?;
        self.history
            .push(Edit::new("drag roof").updated(self.id, self.before.clone(), after));
        debug!(id = ?self.id, handle = ?self.session.handle(), "roof drag released");
        Ok(true)
    }

    fn write(&mut self, segment: RoofSegment) -> Result<NodeRecord> {
        let record = NodeRecord {
            node: Node::Roof(segment),
            ..self.before.clone()
        };
        self.repo.update_node(self.id, record.clone())?;
        Ok(record)
    }
}

impl<R: NodeRepository + ?Sized> Drop for RoofDrag<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!(id = ?self.id, error = %e, "roof drag teardown failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::model::{FloorData, MemoryStore};

    const SNAP: Modifiers = Modifiers {
        snap: true,
        fine: false,
    };

    fn roof(left: f64, right: f64) -> RoofSegment {
        RoofSegment::new(GridPoint::new(0.0, 0.0), GridPoint::new(6.0, 0.0), left, right, 2.0)
    }

    fn session(origin: RoofSegment, handle: RoofHandle, at: GridPoint) -> RoofDragSession {
        RoofDragSession::begin(origin, handle, PointerSample::at(at), RoofConfig::default())
    }

    fn ridge_offset(seg: &RoofSegment, origin: &RoofSegment) -> f64 {
        (seg.start - origin.start).dot(&origin.perp_direction().unwrap())
    }

    #[test]
    fn symmetric_side_drag_shifts_ridge_by_half() {
        let origin = roof(2.0, 2.0);
        let mut s = session(origin, RoofHandle::EdgeLeft, GridPoint::new(3.0, 2.0));
        let seg = s.update(&PointerSample::at(GridPoint::new(3.0, 3.0)));
        assert_abs_diff_eq!(ridge_offset(&seg, &origin), 0.5);
        assert_abs_diff_eq!(seg.left_width, 2.5);
        assert_abs_diff_eq!(seg.right_width, 2.5);
    }

    #[test]
    fn asymmetric_side_drag_keeps_opposite_edge() {
        let origin = roof(1.0, 3.0);
        let mut s = session(origin, RoofHandle::EdgeLeft, GridPoint::new(3.0, 1.0));
        let seg = s.update(&PointerSample::at(GridPoint::new(3.0, 2.0)));
        assert_abs_diff_eq!(ridge_offset(&seg, &origin), -0.5);
        assert_abs_diff_eq!(seg.left_width, 2.5);
        assert_abs_diff_eq!(seg.right_width, 2.5);
        // Right edge stayed at y = -3, left edge moved to y = 2.
        let c = seg.base_corners().unwrap();
        assert_abs_diff_eq!(c[1].y, -3.0);
        assert_abs_diff_eq!(c[0].y, 2.0);
    }

    #[test]
    fn ridge_stays_centred_after_side_drags() {
        let origin = roof(1.5, 0.7);
        let mut s = session(origin, RoofHandle::EdgeRight, GridPoint::new(2.0, -0.7));
        for y in [-1.0, -2.3, -0.9, 0.4] {
            let seg = s.update(&PointerSample::at(GridPoint::new(2.0, y)));
            assert_abs_diff_eq!(seg.left_width, seg.right_width, epsilon = 1e-12);
            let c = seg.base_corners().unwrap();
            let to_left = (c[0] - seg.start).norm();
            let to_right = (c[1] - seg.start).norm();
            assert_abs_diff_eq!(to_left, to_right, epsilon = 1e-12);
        }
    }

    #[test]
    fn side_drag_cannot_collapse_the_footprint() {
        let origin = roof(1.0, 1.0);
        let mut s = session(origin, RoofHandle::EdgeRight, GridPoint::new(3.0, -1.0));
        let seg = s.update(&PointerSample::at(GridPoint::new(3.0, 20.0)));
        assert_abs_diff_eq!(seg.total_width(), 2.0 * RoofConfig::default().min_width);
    }

    #[test]
    fn height_is_snapped_and_clamped() {
        let origin = roof(2.0, 2.0);
        let start = PointerSample::at(GridPoint::new(3.0, 0.0)).with_elevation(2.0);
        let mut s = RoofDragSession::begin(origin, RoofHandle::RidgeHeight, start, RoofConfig::default());

        let seg = s.update(&start.with_elevation(2.37).with_modifiers(SNAP));
        assert_abs_diff_eq!(seg.height, 2.4, epsilon = 1e-9);
        assert_eq!(seg.start, origin.start);

        assert_abs_diff_eq!(s.update(&start.with_elevation(40.0)).height, 10.0);
        assert_abs_diff_eq!(s.update(&start.with_elevation(-40.0)).height, 0.5);
    }

    #[test]
    fn front_edge_snaps_and_keeps_minimum_ridge() {
        let origin = roof(2.0, 2.0);
        let mut s = session(origin, RoofHandle::EdgeFront, GridPoint::new(0.0, 0.0));
        let seg = s.update(&PointerSample::at(GridPoint::new(1.3, 0.4)).with_modifiers(SNAP));
        assert_abs_diff_eq!(seg.start, GridPoint::new(1.0, 0.0));
        assert_eq!(seg.end, origin.end);

        let seg = s.update(&PointerSample::at(GridPoint::new(50.0, 0.0)));
        assert!(seg.ridge_length() >= SEGMENT_EPSILON - 1e-9);
        assert!(seg.start.x < seg.end.x);
    }

    #[test]
    fn back_edge_extends_the_ridge() {
        let origin = roof(2.0, 2.0);
        let mut s = session(origin, RoofHandle::EdgeBack, GridPoint::new(6.0, 0.0));
        let seg = s.update(&PointerSample::at(GridPoint::new(8.0, 1.0)));
        assert_abs_diff_eq!(seg.end, GridPoint::new(8.0, 0.0));
        assert_abs_diff_eq!(seg.ridge_length(), 8.0);
    }

    #[test]
    fn fine_modifier_scales_movement() {
        let origin = roof(2.0, 2.0);
        let mut s = session(origin, RoofHandle::EdgeFront, GridPoint::new(0.0, 0.0));
        let fine = Modifiers {
            snap: false,
            fine: true,
        };
        let seg = s.update(&PointerSample::at(GridPoint::new(1.0, 0.0)).with_modifiers(fine));
        assert_abs_diff_eq!(seg.start, GridPoint::new(0.1, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn rotation_snaps_to_45_and_rounds_on_release() {
        let origin = RoofSegment::symmetric(GridPoint::new(0.0, 0.0), GridPoint::new(4.0, 0.0), 2.0, 2.0);
        let pivot = origin.footprint_centroid();
        let mut s = session(origin, RoofHandle::Rotate, pivot + Vector2::new(2.0, 0.0));

        let a = 50f64.to_radians();
        let p = pivot + Vector2::new(a.cos(), a.sin()) * 2.0;
        let seg = s.update(&PointerSample::at(p).with_modifiers(SNAP));
        let expected = rotate_about(&origin.end, &pivot, FRAC_PI_4);
        assert_abs_diff_eq!(seg.end, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(seg.ridge_length(), 4.0, epsilon = 1e-12);

        let done = s.finish();
        assert_abs_diff_eq!(done.end, GridPoint::new(3.4, 1.4), epsilon = 1e-9);
        assert_abs_diff_eq!(done.start, GridPoint::new(0.6, -1.4), epsilon = 1e-9);
    }

    #[test]
    fn rotation_unwraps_past_half_turn() {
        let origin = RoofSegment::symmetric(GridPoint::new(0.0, 0.0), GridPoint::new(4.0, 0.0), 2.0, 2.0);
        let pivot = origin.footprint_centroid();
        let at = |deg: f64| {
            let a = deg.to_radians();
            PointerSample::at(pivot + Vector2::new(a.cos(), a.sin()))
        };
        let mut s = session(origin, RoofHandle::Rotate, at(0.0).position);
        s.update(&at(90.0));
        s.update(&at(170.0));
        let seg = s.update(&at(-170.0));
        let expected = rotate_about(&origin.end, &pivot, 190f64.to_radians());
        assert_abs_diff_eq!(seg.end, expected, epsilon = 1e-9);
    }

    #[test]
    fn translations_follow_their_axis() {
        let origin = roof(2.0, 2.0);
        let target = PointerSample::at(GridPoint::new(1.4, -0.6));

        let mut along = session(origin, RoofHandle::TranslateRidgeAxis, GridPoint::origin());
        assert_abs_diff_eq!(along.update(&target).start, GridPoint::new(1.4, 0.0));

        let mut across = session(origin, RoofHandle::TranslatePerpAxis, GridPoint::origin());
        assert_abs_diff_eq!(across.update(&target).start, GridPoint::new(0.0, -0.6));

        let mut free = session(origin, RoofHandle::TranslateFree, GridPoint::origin());
        let seg = free.update(&target.with_modifiers(SNAP));
        assert_abs_diff_eq!(seg.start, GridPoint::new(1.0, -1.0));
        assert_abs_diff_eq!(seg.end, GridPoint::new(7.0, -1.0));
    }

    fn store_with_roof() -> (MemoryStore, NodeId, RoofSegment) {
        let mut store = MemoryStore::new();
        let floor = store.add_floor(FloorData {
            name: "ground".into(),
            elevation: 0.0,
        });
        let r = roof(2.0, 2.0);
        let id = store.add_node(NodeRecord::new(floor, Node::Roof(r))).unwrap();
        (store, id, r)
    }

    #[test]
    fn release_pushes_single_history_entry() {
        let (mut store, id, origin) = store_with_roof();
        let mut history = History::new();
        {
            let mut drag = RoofDrag::begin(
                &mut store,
                &mut history,
                id,
                RoofHandle::EdgeLeft,
                PointerSample::at(GridPoint::new(3.0, 2.0)),
                RoofConfig::default(),
            )
            .unwrap();
            for y in [2.2, 2.6, 3.0] {
                drag.update(&PointerSample::at(GridPoint::new(3.0, y))).unwrap();
            }
            assert!(drag.release().unwrap());
        }
        assert_eq!(history.undo_count(), 1);
        assert_abs_diff_eq!(store.roof(id).unwrap().left_width, 2.5);

        history.undo(&mut store).unwrap();
        assert_eq!(store.roof(id).unwrap(), origin);
    }

    #[test]
    fn unchanged_drag_pushes_nothing() {
        let (mut store, id, origin) = store_with_roof();
        let mut history = History::new();
        let anchor = PointerSample::at(GridPoint::new(3.0, 0.0));
        let mut drag = RoofDrag::begin(
            &mut store,
            &mut history,
            id,
            RoofHandle::Rotate,
            anchor,
            RoofConfig::default(),
        )
        .unwrap();
        drag.update(&anchor).unwrap();
        assert!(!drag.release().unwrap());
        assert!(!history.can_undo());
        assert_eq!(store.roof(id).unwrap(), origin);
    }

    #[test]
    fn dropped_drag_still_records_its_edit() {
        let (mut store, id, _) = store_with_roof();
        let mut history = History::new();
        {
            let mut drag = RoofDrag::begin(
                &mut store,
                &mut history,
                id,
                RoofHandle::TranslateFree,
                PointerSample::at(GridPoint::origin()),
                RoofConfig::default(),
            )
            .unwrap();
            drag.update(&PointerSample::at(GridPoint::new(1.0, 1.0))).unwrap();
        }
        assert_eq!(history.undo_count(), 1);
        assert_abs_diff_eq!(store.roof(id).unwrap().start, GridPoint::new(1.0, 1.0));
    }

    #[test]
    fn begin_rejects_non_roof_nodes() {
        let mut store = MemoryStore::new();
        let floor = store.add_floor(FloorData {
            name: "ground".into(),
            elevation: 0.0,
        });
        let group = store
            .add_node(NodeRecord::new(floor, Node::Group(crate::model::Group { name: "g".into() })))
            .unwrap();
        let mut history = History::new();
        let r = RoofDrag::begin(
            &mut store,
            &mut history,
            group,
            RoofHandle::Rotate,
            PointerSample::at(GridPoint::origin()),
            RoofConfig::default(),
        );
        assert!(r.is_err());
    }
}
