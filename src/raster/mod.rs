//! Per-image labelmaps and the manager that owns them.

mod entity;
mod layer;
mod manager;

pub use entity::{PendingMask, Raster, RasterId};
pub use manager::RasterManager;
