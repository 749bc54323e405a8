// geotag/src/handoff/mod.rs
mod map;
mod store;

pub use map::{MapView, DEFAULT_ZOOM, NO_COORDINATES_MESSAGE};
pub use store::{JsonFileStore, RecordStore};
