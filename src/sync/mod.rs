pub mod controller;
pub mod store;

pub use controller::{SyncController, SyncHandle};
pub use store::{Store, TrackerState, Update};
