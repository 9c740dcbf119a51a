//! Gable roofs: solid derivation and handle dragging.

mod drag;
mod geometry;

pub use drag::{Modifiers, PointerSample, RoofDrag, RoofDragSession, RoofHandle};
pub use geometry::{build_roofs, BuildRoof, RoofFace, RoofFaceKind, RoofGeometry};
