pub mod config;
pub mod error;
pub mod grid;
pub mod history;
pub mod math;
pub mod mesh;
pub mod model;
pub mod network;
pub mod placement;
pub mod polygon;
pub mod roof;
pub mod room;

pub use error::{FloorplanError, Result};
